//! Diagnostic snapshots.

use crate::{FaultKind, FaultRecord, HealthSnapshot, LogEntry, SystemState};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the monitor for the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Current state.
    pub state: SystemState,
    /// Health metrics.
    pub health: HealthSnapshot,
    /// Entries currently held by the event log.
    pub log_count: usize,
    /// Entries dropped by event log eviction.
    pub log_evicted: u64,
    /// Most recent entries, oldest first.
    pub recent_entries: Vec<LogEntry>,
    /// Fault history in recording order.
    pub faults: Vec<FaultRecord>,
    /// Fault records dropped because the history was saturated.
    pub history_dropped: u32,
    /// Whether fault injection is enabled.
    pub fault_injection_enabled: bool,
    /// Currently active injected fault.
    pub active_fault: Option<FaultKind>,
}

impl DiagnosticReport {
    /// Number of fault records not yet resolved.
    pub fn unresolved_faults(&self) -> usize {
        self.faults.iter().filter(|r| !r.is_resolved()).count()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Debug Information ===")?;
        writeln!(f, "System State: {}", self.state)?;
        writeln!(f, "Uptime: {} seconds", self.health.uptime_seconds)?;
        writeln!(f, "Fault Count: {}", self.health.fault_count)?;
        writeln!(f, "Recovery Count: {}", self.health.recovery_count)?;
        writeln!(f, "CPU Usage: {:.1}%", self.health.cpu_usage_percent)?;
        writeln!(f, "Memory Usage: {:.1}%", self.health.memory_usage_percent)?;
        match self.active_fault {
            Some(kind) if self.fault_injection_enabled => writeln!(f, "Active Fault: {kind}")?,
            _ => writeln!(f, "Active Fault: none")?,
        }

        writeln!(f)?;
        writeln!(f, "Recent Log Entries:")?;
        for entry in &self.recent_entries {
            writeln!(f, "  [{}] {}", entry.severity().short_label(), entry.message())?;
        }

        writeln!(f)?;
        writeln!(f, "Fault History:")?;
        for record in &self.faults {
            let status = if record.is_resolved() { "RESOLVED" } else { "ACTIVE" };
            writeln!(f, "  {status}: {}", record.description())?;
        }
        if self.history_dropped > 0 {
            writeln!(f, "  ({} further faults not recorded)", self.history_dropped)?;
        }
        Ok(())
    }
}
