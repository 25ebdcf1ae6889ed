//! Fault kinds, fault records and the saturating fault history.

use crate::event::bounded;
use crate::{ErrorCode, Severity};
use core::fmt;
use core::fmt::Write as _;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Maximum number of fault records retained.
pub const FAULT_HISTORY_CAPACITY: usize = 50;

/// Maximum length of a fault description in bytes.
pub const DESCRIPTION_CAPACITY: usize = 127;

/// Kinds of synthetic fault that can be injected.
///
/// Each kind maps to a fixed severity and error code for the effect events
/// it produces while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    /// Noisy sensor readings.
    SensorNoise,
    /// Actuator no longer follows commands.
    ActuatorFail,
    /// Communication link broken.
    CommBreak,
    /// Supply voltage spikes.
    PowerSpike,
    /// Memory leaking or corrupting.
    MemoryLeak,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::SensorNoise => write!(f, "Sensor noise"),
            FaultKind::ActuatorFail => write!(f, "Actuator failure"),
            FaultKind::CommBreak => write!(f, "Communication break"),
            FaultKind::PowerSpike => write!(f, "Power spike"),
            FaultKind::MemoryLeak => write!(f, "Memory leak"),
        }
    }
}

impl FaultKind {
    /// Number of fault kinds.
    pub const COUNT: usize = 5;

    /// All fault kinds, in injection-menu order.
    pub const ALL: [FaultKind; Self::COUNT] = [
        FaultKind::SensorNoise,
        FaultKind::ActuatorFail,
        FaultKind::CommBreak,
        FaultKind::PowerSpike,
        FaultKind::MemoryLeak,
    ];

    /// Position of this kind in [`FaultKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            FaultKind::SensorNoise => 0,
            FaultKind::ActuatorFail => 1,
            FaultKind::CommBreak => 2,
            FaultKind::PowerSpike => 3,
            FaultKind::MemoryLeak => 4,
        }
    }

    /// Look up a kind by its position in [`FaultKind::ALL`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Severity of the effect events this fault produces.
    pub fn effect_severity(&self) -> Severity {
        match self {
            FaultKind::SensorNoise => Severity::Warning,
            FaultKind::ActuatorFail => Severity::Error,
            FaultKind::CommBreak => Severity::Error,
            FaultKind::PowerSpike => Severity::Warning,
            FaultKind::MemoryLeak => Severity::Critical,
        }
    }

    /// Error code of the effect events this fault produces.
    pub fn effect_code(&self) -> ErrorCode {
        match self {
            FaultKind::SensorNoise => ErrorCode::SensorFailure,
            FaultKind::ActuatorFail => ErrorCode::ActuatorStuck,
            FaultKind::CommBreak => ErrorCode::CommunicationLost,
            FaultKind::PowerSpike => ErrorCode::PowerFluctuation,
            FaultKind::MemoryLeak => ErrorCode::MemoryCorruption,
        }
    }

    /// Message of the effect events this fault produces.
    pub fn effect_message(&self) -> &'static str {
        match self {
            FaultKind::SensorNoise => "Sensor noise simulation active",
            FaultKind::ActuatorFail => "Actuator failure simulation active",
            FaultKind::CommBreak => "Communication break simulation active",
            FaultKind::PowerSpike => "Power fluctuation simulation active",
            FaultKind::MemoryLeak => "Memory corruption simulation active",
        }
    }

    /// Returns true if this fault's effects escalate a running system.
    pub fn escalates(&self) -> bool {
        self.effect_severity().escalates()
    }
}

/// A visible effect produced by an active fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultEffect {
    /// Fault that produced the effect.
    pub kind: FaultKind,
    /// Severity to log the effect at.
    pub severity: Severity,
    /// Error code to log the effect with.
    pub code: ErrorCode,
    /// Message to log.
    pub message: &'static str,
}

impl FaultEffect {
    /// Effect event for `kind`.
    pub fn for_kind(kind: FaultKind) -> Self {
        Self {
            kind,
            severity: kind.effect_severity(),
            code: kind.effect_code(),
            message: kind.effect_message(),
        }
    }
}

/// A single fault occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    timestamp: Duration,
    kind: FaultKind,
    code: ErrorCode,
    resolved: bool,
    description: heapless::String<DESCRIPTION_CAPACITY>,
}

impl FaultRecord {
    /// Create an unresolved record with a generated description.
    pub fn injected(kind: FaultKind, timestamp: Duration) -> Self {
        let mut description = heapless::String::new();
        // Truncation is acceptable; the kind name always fits.
        let _ = write!(description, "Injected fault: {kind}");
        Self {
            timestamp,
            kind,
            code: kind.effect_code(),
            resolved: false,
            description,
        }
    }

    /// Create an unresolved record with a custom description.
    pub fn with_description(kind: FaultKind, timestamp: Duration, description: &str) -> Self {
        Self {
            timestamp,
            kind,
            code: kind.effect_code(),
            resolved: false,
            description: bounded(description),
        }
    }

    /// Time the fault was recorded.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Fault kind.
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Associated error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Whether the fault has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Mark resolved. Returns `true` if the record was unresolved.
    pub fn resolve(&mut self) -> bool {
        let was_unresolved = !self.resolved;
        self.resolved = true;
        was_unresolved
    }
}

/// Saturating, fixed-capacity table of fault records.
///
/// Once [`FAULT_HISTORY_CAPACITY`] records are held, further records are
/// dropped and counted rather than evicting older ones.
#[derive(Debug, Clone, Default)]
pub struct FaultHistory {
    records: heapless::Vec<FaultRecord, FAULT_HISTORY_CAPACITY>,
    dropped: u32,
}

impl FaultHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fault.
    ///
    /// Returns `true` if stored, `false` if the history is saturated.
    pub fn record(&mut self, record: FaultRecord) -> bool {
        if self.records.push(record).is_ok() {
            return true;
        }
        self.dropped = self.dropped.saturating_add(1);
        false
    }

    /// Mark every unresolved record resolved.
    ///
    /// Returns the positions of the records that changed, in order.
    pub fn resolve_all(&mut self) -> heapless::Vec<usize, FAULT_HISTORY_CAPACITY> {
        let mut resolved = heapless::Vec::new();
        for (index, record) in self.records.iter_mut().enumerate() {
            if record.resolve() {
                // Cannot overflow: both vectors share the same capacity.
                let _ = resolved.push(index);
            }
        }
        resolved
    }

    /// Get a record by position.
    pub fn get(&self, index: usize) -> Option<&FaultRecord> {
        self.records.get(index)
    }

    /// Iterate records in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &FaultRecord> + '_ {
        self.records.iter()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if further records will be dropped.
    pub fn is_saturated(&self) -> bool {
        self.records.is_full()
    }

    /// Number of records dropped because the history was saturated.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Number of records not yet resolved.
    pub fn unresolved(&self) -> usize {
        self.records.iter().filter(|r| !r.is_resolved()).count()
    }
}
