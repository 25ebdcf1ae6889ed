//! Monitor configuration.

use crate::error::{MonitorError, MonitorResult};
use crate::health::{GaugeBand, HealthLimits};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default log sink path, relative to the working directory.
pub const DEFAULT_SINK_PATH: &str = "system_debug.log";

/// Monitor configuration.
///
/// Missing fields deserialize to their defaults, so a partial JSON document
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum number of entries kept in the event log.
    pub event_log_capacity: usize,
    /// Watchdog window (milliseconds).
    pub watchdog_timeout_ms: u64,
    /// Time held in recovery before resuming (milliseconds).
    pub recovery_hold_ms: u64,
    /// Ticks between fault effect generator runs.
    pub effect_tick_divisor: u32,
    /// Generator runs between visible fault effects.
    pub effect_log_interval: u32,
    /// CPU percentage above which an overload is reported.
    pub cpu_overload_percent: f32,
    /// Memory percentage above which memory is reported critical.
    pub memory_critical_percent: f32,
    /// CPU band during normal operation.
    pub operating_cpu: GaugeBand,
    /// Memory band during normal operation.
    pub operating_memory: GaugeBand,
    /// CPU band after recovery.
    pub healthy_cpu: GaugeBand,
    /// Memory band after recovery.
    pub healthy_memory: GaugeBand,
    /// Number of recent entries shown in a diagnostic report.
    pub recent_entries: usize,
    /// Append-mode log file. `None` keeps the log in memory only.
    pub sink_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: crate::DEFAULT_EVENT_LOG_CAPACITY,
            watchdog_timeout_ms: 5000,
            recovery_hold_ms: 2000,
            effect_tick_divisor: crate::DEFAULT_EFFECT_TICK_DIVISOR,
            effect_log_interval: crate::DEFAULT_EFFECT_LOG_INTERVAL,
            cpu_overload_percent: 90.0,
            memory_critical_percent: 85.0,
            operating_cpu: GaugeBand::OPERATING_CPU,
            operating_memory: GaugeBand::OPERATING_MEMORY,
            healthy_cpu: GaugeBand::HEALTHY_CPU,
            healthy_memory: GaugeBand::HEALTHY_MEMORY,
            recent_entries: 5,
            sink_path: Some(PathBuf::from(DEFAULT_SINK_PATH)),
        }
    }
}

impl MonitorConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.event_log_capacity == 0 {
            return Err(MonitorError::invalid_configuration(
                "event_log_capacity must be greater than 0",
            ));
        }
        if self.watchdog_timeout_ms == 0 {
            return Err(MonitorError::invalid_configuration(
                "watchdog_timeout_ms must be greater than 0",
            ));
        }
        if self.effect_tick_divisor == 0 {
            return Err(MonitorError::invalid_configuration(
                "effect_tick_divisor must be greater than 0",
            ));
        }
        if self.effect_log_interval == 0 {
            return Err(MonitorError::invalid_configuration(
                "effect_log_interval must be greater than 0",
            ));
        }
        for (name, value) in [
            ("cpu_overload_percent", self.cpu_overload_percent),
            ("memory_critical_percent", self.memory_critical_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(MonitorError::invalid_configuration(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }
        for (name, band) in [
            ("operating_cpu", self.operating_cpu),
            ("operating_memory", self.operating_memory),
            ("healthy_cpu", self.healthy_cpu),
            ("healthy_memory", self.healthy_memory),
        ] {
            if !band.is_valid() {
                return Err(MonitorError::invalid_configuration(format!(
                    "{name} must satisfy 0 <= min < max <= 100, got [{}, {})",
                    band.min, band.max
                )));
            }
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// Watchdog window.
    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }

    /// Recovery hold time.
    pub fn recovery_hold(&self) -> Duration {
        Duration::from_millis(self.recovery_hold_ms)
    }

    /// Health thresholds and bands.
    pub fn health_limits(&self) -> HealthLimits {
        HealthLimits {
            cpu_overload_percent: self.cpu_overload_percent,
            memory_critical_percent: self.memory_critical_percent,
            operating_cpu: self.operating_cpu,
            operating_memory: self.operating_memory,
            healthy_cpu: self.healthy_cpu,
            healthy_memory: self.healthy_memory,
        }
    }
}

/// Builder for `MonitorConfig`.
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// Set event log capacity.
    #[must_use]
    pub fn event_log_capacity(mut self, capacity: usize) -> Self {
        self.config.event_log_capacity = capacity;
        self
    }

    /// Set watchdog window in milliseconds.
    #[must_use]
    pub fn watchdog_timeout_ms(mut self, ms: u64) -> Self {
        self.config.watchdog_timeout_ms = ms;
        self
    }

    /// Set recovery hold in milliseconds.
    #[must_use]
    pub fn recovery_hold_ms(mut self, ms: u64) -> Self {
        self.config.recovery_hold_ms = ms;
        self
    }

    /// Set fault effect cadence.
    #[must_use]
    pub fn effect_cadence(mut self, tick_divisor: u32, log_interval: u32) -> Self {
        self.config.effect_tick_divisor = tick_divisor;
        self.config.effect_log_interval = log_interval;
        self
    }

    /// Set CPU overload threshold.
    #[must_use]
    pub fn cpu_overload_percent(mut self, percent: f32) -> Self {
        self.config.cpu_overload_percent = percent;
        self
    }

    /// Set memory critical threshold.
    #[must_use]
    pub fn memory_critical_percent(mut self, percent: f32) -> Self {
        self.config.memory_critical_percent = percent;
        self
    }

    /// Set operating gauge bands.
    #[must_use]
    pub fn operating_bands(mut self, cpu: GaugeBand, memory: GaugeBand) -> Self {
        self.config.operating_cpu = cpu;
        self.config.operating_memory = memory;
        self
    }

    /// Set post-recovery gauge bands.
    #[must_use]
    pub fn healthy_bands(mut self, cpu: GaugeBand, memory: GaugeBand) -> Self {
        self.config.healthy_cpu = cpu;
        self.config.healthy_memory = memory;
        self
    }

    /// Set number of recent entries in diagnostic reports.
    #[must_use]
    pub fn recent_entries(mut self, count: usize) -> Self {
        self.config.recent_entries = count;
        self
    }

    /// Set the log sink path.
    #[must_use]
    pub fn sink_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.sink_path = Some(path.into());
        self
    }

    /// Keep the log in memory only.
    #[must_use]
    pub fn without_sink(mut self) -> Self {
        self.config.sink_path = None;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> MonitorResult<MonitorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
