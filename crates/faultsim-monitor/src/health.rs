//! System state, health gauges and the watchdog window.
//!
//! This module provides the [`SystemState`] machine, the [`HealthSnapshot`]
//! exposed to collaborators, and the [`HealthTracker`] that recomputes
//! derived metrics on every tick.

use crate::{ErrorCode, Severity};
use core::fmt;
use core::time::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Default watchdog window.
pub const DEFAULT_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Monitor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SystemState {
    /// Created, not yet started.
    #[default]
    Init,
    /// Normal operation.
    Running,
    /// An error-level event occurred while running.
    Fault,
    /// Recovery in progress.
    Recovery,
    /// Shut down. Terminal.
    Shutdown,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemState::Init => write!(f, "INIT"),
            SystemState::Running => write!(f, "RUNNING"),
            SystemState::Fault => write!(f, "FAULT"),
            SystemState::Recovery => write!(f, "RECOVERY"),
            SystemState::Shutdown => write!(f, "SHUTDOWN"),
        }
    }
}

impl SystemState {
    /// Check whether the state machine permits `self -> next`.
    ///
    /// ```text
    /// Init     -> Running
    /// Running  -> Fault
    /// Fault    -> Recovery
    /// Recovery -> Running
    /// any non-terminal state -> Shutdown
    /// ```
    pub fn can_transition_to(&self, next: SystemState) -> bool {
        matches!(
            (self, next),
            (SystemState::Init, SystemState::Running)
                | (SystemState::Running, SystemState::Fault)
                | (SystemState::Fault, SystemState::Recovery)
                | (SystemState::Recovery, SystemState::Running)
                | (
                    SystemState::Init
                        | SystemState::Running
                        | SystemState::Fault
                        | SystemState::Recovery,
                    SystemState::Shutdown
                )
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SystemState::Shutdown)
    }

    /// All states.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Init,
            Self::Running,
            Self::Fault,
            Self::Recovery,
            Self::Shutdown,
        ]
        .into_iter()
    }
}

/// Point-in-time health metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Current state.
    pub state: SystemState,
    /// Whole seconds since the monitor was started.
    pub uptime_seconds: u64,
    /// Number of error-or-higher events ever logged.
    pub fault_count: u32,
    /// Number of recoveries ever started.
    pub recovery_count: u32,
    /// Simulated CPU load, percent.
    pub cpu_usage_percent: f32,
    /// Simulated memory usage, percent.
    pub memory_usage_percent: f32,
    /// Monitor time of the last health check.
    pub last_check: Duration,
}

/// Half-open percentage band `[min, max)` for a simulated gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeBand {
    /// Inclusive lower bound.
    pub min: f32,
    /// Exclusive upper bound.
    pub max: f32,
}

impl GaugeBand {
    /// CPU band during normal operation.
    pub const OPERATING_CPU: GaugeBand = GaugeBand::new(10.0, 50.0);
    /// Memory band during normal operation.
    pub const OPERATING_MEMORY: GaugeBand = GaugeBand::new(20.0, 80.0);
    /// CPU band right after a recovery.
    pub const HEALTHY_CPU: GaugeBand = GaugeBand::new(15.0, 35.0);
    /// Memory band right after a recovery.
    pub const HEALTHY_MEMORY: GaugeBand = GaugeBand::new(25.0, 50.0);

    /// Create a band.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies in the band.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }

    /// Check that the band is non-empty and within `[0, 100]`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.max <= 100.0
            && self.min < self.max
    }
}

/// Source of simulated gauge readings.
pub trait GaugeSource {
    /// Produce a reading within `band`.
    fn sample(&mut self, band: GaugeBand) -> f32;
}

/// Uniformly random gauge readings.
#[derive(Debug, Clone)]
pub struct RandomGauges {
    rng: StdRng,
}

impl RandomGauges {
    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic readings for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl GaugeSource for RandomGauges {
    fn sample(&mut self, band: GaugeBand) -> f32 {
        if !band.is_valid() {
            return band.min;
        }
        self.rng.random_range(band.min..band.max)
    }
}

/// A health condition found during a tick, to be logged by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthFinding {
    /// Severity to log at.
    pub severity: Severity,
    /// Error code to log with.
    pub code: ErrorCode,
    /// Message to log.
    pub message: &'static str,
}

/// Watchdog window: reports at most one timeout per window.
#[derive(Debug, Clone)]
pub struct WatchdogWindow {
    timeout: Duration,
    last_feed: Duration,
    timeouts: u32,
}

impl WatchdogWindow {
    /// Start a window at `now`.
    pub fn new(timeout: Duration, now: Duration) -> Self {
        Self {
            timeout,
            last_feed: now,
            timeouts: 0,
        }
    }

    /// Restart the window at `now` without reporting.
    pub fn feed(&mut self, now: Duration) {
        self.last_feed = now;
    }

    /// Check the window at `now`.
    ///
    /// Returns `true` exactly once per expired window; the next window
    /// starts at `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_feed) < self.timeout {
            return false;
        }
        self.timeouts = self.timeouts.saturating_add(1);
        self.last_feed = now;
        true
    }

    /// Time the current window started.
    pub fn last_feed(&self) -> Duration {
        self.last_feed
    }

    /// Number of timeouts reported.
    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    /// Window length.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Thresholds and bands driving [`HealthTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthLimits {
    /// CPU percentage above which an overload is reported.
    pub cpu_overload_percent: f32,
    /// Memory percentage above which memory is reported critical.
    pub memory_critical_percent: f32,
    /// CPU band during normal operation.
    pub operating_cpu: GaugeBand,
    /// Memory band during normal operation.
    pub operating_memory: GaugeBand,
    /// CPU band applied after recovery.
    pub healthy_cpu: GaugeBand,
    /// Memory band applied after recovery.
    pub healthy_memory: GaugeBand,
}

impl Default for HealthLimits {
    fn default() -> Self {
        Self {
            cpu_overload_percent: 90.0,
            memory_critical_percent: 85.0,
            operating_cpu: GaugeBand::OPERATING_CPU,
            operating_memory: GaugeBand::OPERATING_MEMORY,
            healthy_cpu: GaugeBand::HEALTHY_CPU,
            healthy_memory: GaugeBand::HEALTHY_MEMORY,
        }
    }
}

/// Recomputes derived health metrics each tick.
#[derive(Debug, Clone)]
pub struct HealthTracker {
    snapshot: HealthSnapshot,
    started_at: Duration,
    watchdog: WatchdogWindow,
    limits: HealthLimits,
}

impl HealthTracker {
    /// Create a tracker whose uptime and watchdog window start at `now`.
    pub fn new(limits: HealthLimits, watchdog_timeout: Duration, now: Duration) -> Self {
        Self {
            snapshot: HealthSnapshot {
                last_check: now,
                ..HealthSnapshot::default()
            },
            started_at: now,
            watchdog: WatchdogWindow::new(watchdog_timeout, now),
            limits,
        }
    }

    /// Restart uptime and the watchdog window at `now`.
    pub fn restart_clock(&mut self, now: Duration) {
        self.started_at = now;
        self.snapshot.last_check = now;
        self.snapshot.uptime_seconds = 0;
        self.watchdog.feed(now);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &HealthSnapshot {
        &self.snapshot
    }

    /// Current state.
    pub fn state(&self) -> SystemState {
        self.snapshot.state
    }

    /// Overwrite the state. Transition rules are enforced by the caller.
    pub(crate) fn set_state(&mut self, state: SystemState) {
        self.snapshot.state = state;
    }

    /// Count an error-or-higher event.
    pub(crate) fn record_fault(&mut self) {
        self.snapshot.fault_count = self.snapshot.fault_count.saturating_add(1);
    }

    /// Count a recovery.
    pub(crate) fn record_recovery(&mut self) {
        self.snapshot.recovery_count = self.snapshot.recovery_count.saturating_add(1);
    }

    /// Watchdog window.
    pub fn watchdog(&self) -> &WatchdogWindow {
        &self.watchdog
    }

    /// Feed the watchdog at `now`.
    pub fn feed_watchdog(&mut self, now: Duration) {
        self.watchdog.feed(now);
    }

    /// Thresholds in effect.
    pub fn limits(&self) -> &HealthLimits {
        &self.limits
    }

    /// Run one health check at `now`.
    ///
    /// Returns the conditions the caller should log, in detection order.
    pub fn tick(
        &mut self,
        now: Duration,
        gauges: &mut dyn GaugeSource,
    ) -> heapless::Vec<HealthFinding, 3> {
        let mut findings = heapless::Vec::new();

        self.snapshot.uptime_seconds = now.saturating_sub(self.started_at).as_secs();

        self.snapshot.cpu_usage_percent = gauges.sample(self.limits.operating_cpu);
        self.snapshot.memory_usage_percent = gauges.sample(self.limits.operating_memory);

        // Capacity is 3 and at most three findings are pushed.
        if self.snapshot.cpu_usage_percent > self.limits.cpu_overload_percent {
            let _ = findings.push(HealthFinding {
                severity: Severity::Error,
                code: ErrorCode::SystemOverload,
                message: "CPU usage critical",
            });
        }
        if self.snapshot.memory_usage_percent > self.limits.memory_critical_percent {
            let _ = findings.push(HealthFinding {
                severity: Severity::Error,
                code: ErrorCode::MemoryCorruption,
                message: "Memory usage critical",
            });
        }
        if self.watchdog.poll(now) {
            let _ = findings.push(HealthFinding {
                severity: Severity::Critical,
                code: ErrorCode::WatchdogTimeout,
                message: "Watchdog timeout detected",
            });
        }

        self.snapshot.last_check = now;
        findings
    }

    /// Reset gauges to the post-recovery healthy band.
    pub fn apply_healthy_gauges(&mut self, gauges: &mut dyn GaugeSource) {
        self.snapshot.cpu_usage_percent = gauges.sample(self.limits.healthy_cpu);
        self.snapshot.memory_usage_percent = gauges.sample(self.limits.healthy_memory);
    }
}
