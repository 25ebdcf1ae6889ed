//! Reference collaborators for the control loop.
//!
//! Each simulator reads the monitor through a [`MonitorPort`] and reports
//! anomalies as events. None of them model real physics.

use crate::{Collaborator, ErrorCode, FaultKind, MonitorPort, Severity, emit_event};
use rand::{Rng, RngCore};

/// Sensor with occasional dropouts.
///
/// A reading fails with a fixed probability; more than `tolerance`
/// consecutive failures is reported as a sensor failure.
#[derive(Debug, Clone)]
pub struct SensorSim {
    failure_probability: f64,
    tolerance: u32,
    consecutive_failures: u32,
    last_reading: Option<u8>,
}

impl Default for SensorSim {
    fn default() -> Self {
        Self::new(0.05, 3)
    }
}

impl SensorSim {
    /// Create a sensor. `failure_probability` is clamped to `[0, 1]`.
    pub fn new(failure_probability: f64, tolerance: u32) -> Self {
        Self {
            failure_probability: failure_probability.clamp(0.0, 1.0),
            tolerance,
            consecutive_failures: 0,
            last_reading: None,
        }
    }

    /// Failures in a row so far.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Last successful reading.
    pub fn last_reading(&self) -> Option<u8> {
        self.last_reading
    }
}

impl Collaborator for SensorSim {
    fn name(&self) -> &'static str {
        "sensor"
    }

    fn update(&mut self, port: &mut dyn MonitorPort, rng: &mut dyn RngCore) {
        let reading: u8 = rng.random_range(0..100);
        if !rng.random_bool(self.failure_probability) {
            self.consecutive_failures = 0;
            self.last_reading = Some(reading);
            return;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_reading = None;
        if self.consecutive_failures > self.tolerance {
            emit_event!(
                port,
                Severity::Error,
                ErrorCode::SensorFailure,
                "Sensor failure detected"
            );
        }
    }
}

/// Actuator that validates its commands.
///
/// Commands are drawn from `0..=100`; while an actuator fault is active the
/// command generator overshoots and out-of-range commands are rejected.
#[derive(Debug, Clone, Default)]
pub struct ActuatorSim {
    rejected: u32,
    last_command: Option<i32>,
}

impl ActuatorSim {
    /// Highest accepted command.
    pub const MAX_COMMAND: i32 = 100;

    /// Create an actuator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command`. Returns `false` and reports if it is out of range.
    pub fn apply(&mut self, port: &mut dyn MonitorPort, command: i32) -> bool {
        if (0..=Self::MAX_COMMAND).contains(&command) {
            self.last_command = Some(command);
            return true;
        }
        self.rejected = self.rejected.saturating_add(1);
        emit_event!(
            port,
            Severity::Warning,
            ErrorCode::InvalidState,
            "Invalid actuator command: {command}"
        );
        false
    }

    /// Number of rejected commands.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// Last accepted command.
    pub fn last_command(&self) -> Option<i32> {
        self.last_command
    }
}

impl Collaborator for ActuatorSim {
    fn name(&self) -> &'static str {
        "actuator"
    }

    fn update(&mut self, port: &mut dyn MonitorPort, rng: &mut dyn RngCore) {
        let command = if port.active_fault() == Some(FaultKind::ActuatorFail) {
            rng.random_range(-20..=120)
        } else {
            rng.random_range(0..=Self::MAX_COMMAND)
        };
        self.apply(port, command);
    }
}

/// Communication link. Frames only drop while a communication break is
/// injected; the injector reports the break itself.
#[derive(Debug, Clone, Default)]
pub struct CommLinkSim {
    frames_sent: u64,
    frames_dropped: u64,
}

impl CommLinkSim {
    /// Create a link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames delivered.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Frames lost to an injected break.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }
}

impl Collaborator for CommLinkSim {
    fn name(&self) -> &'static str {
        "comm"
    }

    fn update(&mut self, port: &mut dyn MonitorPort, _rng: &mut dyn RngCore) {
        if port.active_fault() == Some(FaultKind::CommBreak) {
            self.frames_dropped = self.frames_dropped.saturating_add(1);
        } else {
            self.frames_sent = self.frames_sent.saturating_add(1);
        }
    }
}

/// Supply voltage monitor around a 24 V nominal rail.
#[derive(Debug, Clone)]
pub struct PowerMonitorSim {
    nominal_volts: f32,
    tolerance_volts: f32,
    last_volts: f32,
}

impl Default for PowerMonitorSim {
    fn default() -> Self {
        Self::new(24.0, 2.0)
    }
}

impl PowerMonitorSim {
    /// Swing around nominal in normal operation.
    pub const NORMAL_SWING_VOLTS: f32 = 1.0;
    /// Swing around nominal while a power spike is injected.
    pub const SPIKE_SWING_VOLTS: f32 = 3.0;

    /// Create a monitor reporting readings outside `nominal ± tolerance`.
    pub fn new(nominal_volts: f32, tolerance_volts: f32) -> Self {
        Self {
            nominal_volts,
            tolerance_volts: tolerance_volts.abs(),
            last_volts: nominal_volts,
        }
    }

    /// Last sampled voltage.
    pub fn last_volts(&self) -> f32 {
        self.last_volts
    }

    /// Check a reading, reporting it if outside tolerance.
    pub fn check(&mut self, port: &mut dyn MonitorPort, volts: f32) -> bool {
        self.last_volts = volts;
        if (volts - self.nominal_volts).abs() <= self.tolerance_volts {
            return true;
        }
        emit_event!(
            port,
            Severity::Warning,
            ErrorCode::PowerFluctuation,
            "Power fluctuation detected: {volts:.2} V"
        );
        false
    }
}

impl Collaborator for PowerMonitorSim {
    fn name(&self) -> &'static str {
        "power"
    }

    fn update(&mut self, port: &mut dyn MonitorPort, rng: &mut dyn RngCore) {
        let swing = if port.active_fault() == Some(FaultKind::PowerSpike) {
            Self::SPIKE_SWING_VOLTS
        } else {
            Self::NORMAL_SWING_VOLTS
        };
        let volts = self.nominal_volts + rng.random_range(-swing..swing);
        self.check(port, volts);
    }
}

/// The collaborators of the reference control loop, in update order.
pub fn default_collaborators() -> Vec<Box<dyn Collaborator>> {
    vec![
        Box::new(SensorSim::default()),
        Box::new(ActuatorSim::new()),
        Box::new(CommLinkSim::new()),
        Box::new(PowerMonitorSim::default()),
    ]
}
