//! Narrow interfaces for external collaborators.
//!
//! Collaborators (signal generators, control loops and similar simulators)
//! only ever see a [`MonitorPort`]: they may emit events and read the current
//! health, state and active fault to drive their own simulated behavior.

use crate::{ErrorCode, FaultKind, HealthSnapshot, Severity, SystemState};
use core::time::Duration;
use rand::RngCore;

/// What a collaborator can do with the monitor.
pub trait MonitorPort {
    /// Append a diagnostic event.
    fn emit(&mut self, severity: Severity, code: ErrorCode, message: &str, origin: &str, line: u32);

    /// Current system state.
    fn state(&self) -> SystemState;

    /// Current health snapshot.
    fn health(&self) -> &HealthSnapshot;

    /// Currently active injected fault.
    fn active_fault(&self) -> Option<FaultKind>;

    /// Current monitor time.
    fn now(&self) -> Duration;
}

/// A simulated component updated once per control loop iteration.
pub trait Collaborator: Send {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Run one iteration.
    fn update(&mut self, port: &mut dyn MonitorPort, rng: &mut dyn RngCore);
}
