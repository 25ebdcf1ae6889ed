//! The monitor aggregate.
//!
//! [`MonitorCore`] owns the event log, fault history, health tracker, fault
//! injector, recovery engine and the optional log sink, and drives the
//! system state machine:
//!
//! ```text
//! ┌──────────┐  start   ┌──────────┐  Error/Critical entry  ┌──────────┐
//! │   Init   │─────────▶│ Running  │───────────────────────▶│  Fault   │
//! └──────────┘          └──────────┘                        └────┬─────┘
//!                            ▲                                   │ attempt_recovery
//!                            │ hold elapsed   ┌──────────┐       │
//!                            └────────────────│ Recovery │◀──────┘
//!                                             └──────────┘
//!
//! any state ──shutdown──▶ Shutdown (terminal)
//! ```
//!
//! Time is injected: callers advance the monitor clock with
//! [`MonitorCore::update_time`] or [`MonitorCore::advance`] before calling
//! [`MonitorCore::tick`], so the same code runs against wall-clock or
//! simulated time.

use crate::config::MonitorConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::event_log::EventLog;
use crate::fault::{FaultHistory, FaultKind, FaultRecord};
use crate::health::{GaugeSource, HealthSnapshot, HealthTracker, RandomGauges, SystemState};
use crate::injector::FaultInjector;
use crate::port::MonitorPort;
use crate::recovery::{RecoveryEngine, RecoveryOutcome};
use crate::report::DiagnosticReport;
use crate::sink::{LogSink, TextSink};
use crate::{ErrorCode, LogEntry, Severity, emit_event, emit_info};
use chrono::Utc;
use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::io;

/// Callback invoked for every mirrored (warning or higher) entry.
pub type MirrorCallback = Box<dyn Fn(&LogEntry) + Send + Sync>;

/// How the monitor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownOutcome {
    /// No unresolved fault at shutdown.
    Clean,
    /// The system was still in the fault state.
    UnresolvedFault,
}

impl ShutdownOutcome {
    /// Check if the shutdown was clean.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// What happened during one [`MonitorCore::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    /// Whether the tick ran. Ticks before start and after shutdown are skipped.
    pub ran: bool,
    /// Number of health conditions logged.
    pub health_findings: usize,
    /// Fault whose effect was logged this tick.
    pub fault_effect: Option<FaultKind>,
    /// Recovery completed this tick.
    pub recovery: Option<RecoveryOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Detached,
    Attached,
    Degraded,
    Released,
}

/// Monitoring and fault-recovery core.
pub struct MonitorCore {
    config: MonitorConfig,
    now: Duration,
    log: EventLog,
    history: FaultHistory,
    health: HealthTracker,
    injector: FaultInjector,
    recovery: RecoveryEngine,
    gauges: Box<dyn GaugeSource + Send>,
    sink: Option<Box<dyn LogSink>>,
    sink_state: SinkState,
    sink_write_failures: u64,
    mirrors: Vec<MirrorCallback>,
}

impl MonitorCore {
    /// Create a monitor in [`SystemState::Init`] with no sink attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;
        Ok(Self {
            log: EventLog::with_capacity(config.event_log_capacity),
            history: FaultHistory::new(),
            health: HealthTracker::new(
                config.health_limits(),
                config.watchdog_timeout(),
                Duration::ZERO,
            ),
            injector: FaultInjector::new(config.effect_tick_divisor, config.effect_log_interval),
            recovery: RecoveryEngine::new(config.recovery_hold()),
            gauges: Box::new(RandomGauges::from_entropy()),
            sink: None,
            sink_state: SinkState::Detached,
            sink_write_failures: 0,
            mirrors: Vec::new(),
            now: Duration::ZERO,
            config,
        })
    }

    /// Create, open the configured sink and start the monitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. Sink failures are
    /// not errors; the monitor continues without persistence.
    pub fn open(config: MonitorConfig) -> MonitorResult<Self> {
        let mut monitor = Self::new(config)?;
        monitor.open_sink();
        monitor.start()?;
        Ok(monitor)
    }

    /// Replace the gauge source.
    #[must_use]
    pub fn with_gauges(mut self, gauges: impl GaugeSource + Send + 'static) -> Self {
        self.set_gauges(gauges);
        self
    }

    /// Replace the gauge source.
    pub fn set_gauges(&mut self, gauges: impl GaugeSource + Send + 'static) {
        self.gauges = Box::new(gauges);
    }

    /// Register a callback for mirrored entries.
    pub fn add_mirror_callback<F>(&mut self, callback: F)
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        self.mirrors.push(Box::new(callback));
    }

    /// Attach a sink, replacing any previous one.
    pub fn attach_sink(&mut self, sink: impl LogSink + 'static) {
        self.sink = Some(Box::new(sink));
        self.sink_state = SinkState::Attached;
    }

    /// Open the configured append-mode log file.
    ///
    /// Returns `true` if a sink is attached afterwards. A failure to open is
    /// logged once as a warning and the monitor keeps its log in memory.
    pub fn open_sink(&mut self) -> bool {
        let Some(path) = self.config.sink_path.clone() else {
            return false;
        };
        match TextSink::open_append(&path) {
            Ok(sink) => {
                tracing::debug!(path = %path.display(), "log sink opened");
                self.attach_sink(sink);
                true
            }
            Err(err) => {
                if self.sink_state != SinkState::Degraded {
                    self.sink_state = SinkState::Degraded;
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "could not open log file, continuing without persistence"
                    );
                    emit_event!(
                        self,
                        Severity::Warning,
                        ErrorCode::FileIoError,
                        "Could not open log file: {err}"
                    );
                }
                false
            }
        }
    }

    /// Start the monitor: `Init -> Running`.
    ///
    /// Writes the session start marker, restarts uptime and the watchdog
    /// window at the current monitor time.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidTransition`] if not in `Init`, or
    /// [`MonitorError::ShutDown`] after shutdown.
    pub fn start(&mut self) -> MonitorResult<()> {
        let state = self.state();
        if state.is_terminal() {
            return Err(MonitorError::ShutDown);
        }
        if state != SystemState::Init {
            return Err(MonitorError::InvalidTransition {
                from: state,
                to: SystemState::Running,
            });
        }

        let written = match self.sink.as_mut() {
            Some(sink) => sink.begin_session(Utc::now()),
            None => Ok(()),
        };
        if let Err(err) = written {
            self.note_sink_failure(&err);
        }

        self.health.restart_clock(self.now);
        emit_info!(self, "Debug monitoring system initialized");
        self.health.set_state(SystemState::Running);
        tracing::info!(
            capacity = self.log.capacity(),
            persistent = self.sink.is_some(),
            "monitor running"
        );
        emit_info!(self, "System transitioned to RUNNING state");
        Ok(())
    }

    /// Set the monitor clock. Time never moves backwards.
    pub fn update_time(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance the monitor clock by `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.now = self.now.saturating_add(delta);
    }

    /// Current monitor time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Append a diagnostic entry.
    ///
    /// Never fails. Warning-or-higher entries are mirrored to registered
    /// callbacks; error-or-higher entries count as faults and move a running
    /// system to [`SystemState::Fault`], which itself appends one warning.
    pub fn append(
        &mut self,
        severity: Severity,
        code: ErrorCode,
        message: &str,
        origin: &str,
        line: u32,
    ) {
        self.record(LogEntry::new(self.now, severity, code, message, origin, line));

        if !severity.escalates() {
            return;
        }
        self.health.record_fault();
        if self.health.state() == SystemState::Running {
            self.health.set_state(SystemState::Fault);
            tracing::warn!(code = %code, trigger = message, "system entered fault state");
            emit_event!(self, Severity::Warning, code, "System entered fault state");
        }
    }

    fn record(&mut self, entry: LogEntry) {
        tracing::debug!(
            severity = %entry.severity(),
            code = %entry.code(),
            origin = entry.origin(),
            line = entry.line(),
            "{}",
            entry.message()
        );

        let written = match self.sink.as_mut() {
            Some(sink) => sink.write_entry(&entry),
            None => Ok(()),
        };
        if let Err(err) = written {
            self.note_sink_failure(&err);
        }

        if entry.severity().is_mirrored() {
            for mirror in &self.mirrors {
                mirror(&entry);
            }
        }

        self.log.push(entry);
    }

    fn note_sink_failure(&mut self, err: &io::Error) {
        self.sink_write_failures = self.sink_write_failures.saturating_add(1);
        tracing::warn!(
            error = %err,
            failures = self.sink_write_failures,
            "failed to write to log sink"
        );
    }

    /// Inject a synthetic fault.
    ///
    /// Arms the injector with `kind` and records an unresolved fault. Returns
    /// `false` if the fault history is saturated; the fault is still active.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ShutDown`] after shutdown.
    pub fn inject(&mut self, kind: FaultKind) -> MonitorResult<bool> {
        if self.state().is_terminal() {
            return Err(MonitorError::ShutDown);
        }

        self.injector.arm(kind);
        let recorded = self.history.record(FaultRecord::injected(kind, self.now));
        if !recorded {
            tracing::warn!(
                fault = %kind,
                dropped = self.history.dropped(),
                "fault history saturated, record dropped"
            );
        }
        emit_event!(
            self,
            Severity::Warning,
            ErrorCode::None,
            "Fault injection activated: {kind}"
        );
        Ok(recorded)
    }

    /// Run one monitor iteration at the current monitor time.
    ///
    /// Order: health check, fault effect, recovery deadline.
    pub fn tick(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();
        if matches!(self.state(), SystemState::Init | SystemState::Shutdown) {
            return summary;
        }
        summary.ran = true;

        let findings = self.health.tick(self.now, self.gauges.as_mut());
        for finding in &findings {
            emit_event!(self, finding.severity, finding.code, "{}", finding.message);
        }
        summary.health_findings = findings.len();

        if let Some(effect) = self.injector.tick() {
            emit_event!(self, effect.severity, effect.code, "{}", effect.message);
            summary.fault_effect = Some(effect.kind);
        }

        if let Some(outcome) = self.recovery.poll(self.now) {
            self.finish_recovery();
            summary.recovery = Some(outcome);
        }

        summary
    }

    /// Attempt to recover from the fault state.
    ///
    /// Outside [`SystemState::Fault`] nothing changes. From `Fault`, the
    /// injector is disarmed, every unresolved fault is resolved and the
    /// system holds in [`SystemState::Recovery`] until the configured hold
    /// has elapsed; a later [`tick`](Self::tick) completes the recovery.
    /// A zero hold completes immediately.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ShutDown`] after shutdown.
    pub fn attempt_recovery(&mut self) -> MonitorResult<RecoveryOutcome> {
        let state = self.state();
        if state.is_terminal() {
            return Err(MonitorError::ShutDown);
        }
        if state != SystemState::Fault {
            tracing::info!(state = %state, "no faults to recover from");
            return Ok(RecoveryOutcome::NothingToRecover { state });
        }

        emit_info!(self, "Attempting fault recovery");
        self.injector.disarm();
        self.health.set_state(SystemState::Recovery);
        self.health.record_recovery();

        let resolved = self.history.resolve_all();
        for index in &resolved {
            emit_info!(self, "Fault {} resolved in recovery attempt", index + 1);
        }

        let resume_at = self.recovery.begin(self.now, resolved.len());
        tracing::info!(
            resolved = resolved.len(),
            resume_at_ms = u64::try_from(resume_at.as_millis()).unwrap_or(u64::MAX),
            "recovery started"
        );

        if let Some(outcome) = self.recovery.poll(self.now) {
            self.finish_recovery();
            return Ok(outcome);
        }
        Ok(RecoveryOutcome::InProgress { resume_at })
    }

    fn finish_recovery(&mut self) {
        if self.state() != SystemState::Recovery {
            return;
        }
        self.health.set_state(SystemState::Running);
        self.health.apply_healthy_gauges(self.gauges.as_mut());
        tracing::info!(
            recoveries = self.health.snapshot().recovery_count,
            "recovery complete"
        );
        emit_info!(self, "Fault recovery successful");
    }

    /// Check that the system is in `expected`.
    ///
    /// A mismatch is logged as a critical invalid-state entry, which also
    /// escalates a running system.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::StateAssertion`] on mismatch.
    pub fn expect_state(&mut self, expected: SystemState) -> MonitorResult<()> {
        let actual = self.state();
        if actual == expected {
            return Ok(());
        }
        emit_event!(
            self,
            Severity::Critical,
            ErrorCode::InvalidState,
            "Expected state {expected}, got {actual}"
        );
        Err(MonitorError::StateAssertion { expected, actual })
    }

    /// Restart the watchdog window at the current monitor time.
    pub fn feed_watchdog(&mut self) {
        self.health.feed_watchdog(self.now);
    }

    /// Build a diagnostic report.
    pub fn report(&self) -> DiagnosticReport {
        DiagnosticReport {
            state: self.state(),
            health: self.health.snapshot().clone(),
            log_count: self.log.len(),
            log_evicted: self.log.evicted(),
            recent_entries: self
                .log
                .recent(self.config.recent_entries)
                .cloned()
                .collect(),
            faults: self.history.iter().cloned().collect(),
            history_dropped: self.history.dropped(),
            fault_injection_enabled: self.injector.is_enabled(),
            active_fault: self.injector.active(),
        }
    }

    /// Shut the monitor down.
    ///
    /// Writes the session end marker and releases the sink. Shutting down
    /// from [`SystemState::Fault`] is reported as
    /// [`ShutdownOutcome::UnresolvedFault`] and logged as critical.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ShutDown`] if already shut down.
    pub fn shutdown(&mut self) -> MonitorResult<ShutdownOutcome> {
        let prior = self.state();
        if prior.is_terminal() {
            return Err(MonitorError::ShutDown);
        }

        emit_info!(self, "Shutting down debug monitoring system");
        let outcome = if prior == SystemState::Fault {
            emit_event!(
                self,
                Severity::Critical,
                ErrorCode::InvalidState,
                "System shutdown with unresolved faults"
            );
            ShutdownOutcome::UnresolvedFault
        } else {
            ShutdownOutcome::Clean
        };

        self.health.set_state(SystemState::Shutdown);
        self.release_sink();
        tracing::info!(?outcome, faults = self.health.snapshot().fault_count, "monitor shut down");
        Ok(outcome)
    }

    fn release_sink(&mut self) {
        match self.sink.take() {
            Some(mut sink) => {
                if let Err(err) = sink.end_session(Utc::now()) {
                    self.note_sink_failure(&err);
                    emit_event!(
                        self,
                        Severity::Error,
                        ErrorCode::FileIoError,
                        "Error writing to log file: {err}"
                    );
                }
            }
            None if self.sink_state == SinkState::Degraded => {
                emit_event!(
                    self,
                    Severity::Error,
                    ErrorCode::FileIoError,
                    "Log file not available"
                );
            }
            None => {}
        }
        self.sink_state = SinkState::Released;
    }

    /// Current state.
    pub fn state(&self) -> SystemState {
        self.health.state()
    }

    /// Current health snapshot.
    pub fn health(&self) -> &HealthSnapshot {
        self.health.snapshot()
    }

    /// Health tracker, including the watchdog window.
    pub fn health_tracker(&self) -> &HealthTracker {
        &self.health
    }

    /// Event log.
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Fault history.
    pub fn fault_history(&self) -> &FaultHistory {
        &self.history
    }

    /// Fault injector.
    pub fn injector(&self) -> &FaultInjector {
        &self.injector
    }

    /// Recovery engine.
    pub fn recovery(&self) -> &RecoveryEngine {
        &self.recovery
    }

    /// Whether fault injection is enabled.
    pub fn is_fault_injection_enabled(&self) -> bool {
        self.injector.is_enabled()
    }

    /// Currently active injected fault.
    pub fn active_fault(&self) -> Option<FaultKind> {
        self.injector.active()
    }

    /// Configuration in effect.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Whether a sink is currently attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Whether opening the configured sink failed.
    pub fn is_sink_degraded(&self) -> bool {
        self.sink_state == SinkState::Degraded
    }

    /// Number of sink writes that failed.
    pub fn sink_write_failures(&self) -> u64 {
        self.sink_write_failures
    }
}

impl MonitorPort for MonitorCore {
    fn emit(&mut self, severity: Severity, code: ErrorCode, message: &str, origin: &str, line: u32) {
        self.append(severity, code, message, origin, line);
    }

    fn state(&self) -> SystemState {
        MonitorCore::state(self)
    }

    fn health(&self) -> &HealthSnapshot {
        MonitorCore::health(self)
    }

    fn active_fault(&self) -> Option<FaultKind> {
        MonitorCore::active_fault(self)
    }

    fn now(&self) -> Duration {
        MonitorCore::now(self)
    }
}

impl Drop for MonitorCore {
    fn drop(&mut self) {
        let Some(mut sink) = self.sink.take() else {
            return;
        };
        if let Err(err) = sink.end_session(Utc::now()) {
            tracing::warn!(error = %err, "failed to close log sink on drop");
        }
    }
}

impl fmt::Debug for MonitorCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorCore")
            .field("state", &self.state())
            .field("now", &self.now)
            .field("log_count", &self.log.len())
            .field("faults", &self.history.len())
            .field("active_fault", &self.injector.active())
            .field("sink_state", &self.sink_state)
            .field("mirrors", &self.mirrors.len())
            .finish_non_exhaustive()
    }
}
