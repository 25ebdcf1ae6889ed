//! Diagnostic log entries, severities and error codes.

use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Maximum length of a log message in bytes.
pub const MESSAGE_CAPACITY: usize = 255;

/// Maximum length of an origin label in bytes.
pub const ORIGIN_CAPACITY: usize = 63;

/// Log entry severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Developer detail.
    Debug,
    /// Normal lifecycle information.
    Info,
    /// Abnormal but tolerated condition.
    Warning,
    /// Failure; escalates a running system to the fault state.
    Error,
    /// Severe failure; escalates like [`Severity::Error`].
    Critical,
}

impl Severity {
    /// Returns true if entries of this severity are mirrored to the operator.
    pub fn is_mirrored(&self) -> bool {
        *self >= Severity::Warning
    }

    /// Returns true if entries of this severity count as faults.
    pub fn escalates(&self) -> bool {
        *self >= Severity::Error
    }

    /// Label used on the operator console and in the log sink.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRIT",
        }
    }

    /// Three-letter label used in diagnostic snapshots.
    pub fn short_label(&self) -> &'static str {
        match self {
            Severity::Debug => "DBG",
            Severity::Info => "INF",
            Severity::Warning => "WRN",
            Severity::Error => "ERR",
            Severity::Critical => "CRT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Diagnostic error code attached to log entries and fault records.
///
/// Codes classify the context of an entry; they never drive control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No error associated.
    #[default]
    None,
    /// Sensor produced no usable reading.
    SensorFailure,
    /// Actuator did not follow its command.
    ActuatorStuck,
    /// Communication link dropped.
    CommunicationLost,
    /// Supply voltage outside tolerance.
    PowerFluctuation,
    /// Memory corruption or exhaustion.
    MemoryCorruption,
    /// Watchdog window expired without a feed.
    WatchdogTimeout,
    /// System found in an unexpected state.
    InvalidState,
    /// Log file could not be opened or written.
    FileIoError,
    /// CPU load above the overload threshold.
    SystemOverload,
}

impl ErrorCode {
    /// Numeric code, stable across releases.
    pub fn code(&self) -> u8 {
        match self {
            ErrorCode::None => 0,
            ErrorCode::SensorFailure => 1,
            ErrorCode::ActuatorStuck => 2,
            ErrorCode::CommunicationLost => 3,
            ErrorCode::PowerFluctuation => 4,
            ErrorCode::MemoryCorruption => 5,
            ErrorCode::WatchdogTimeout => 6,
            ErrorCode::InvalidState => 7,
            ErrorCode::FileIoError => 8,
            ErrorCode::SystemOverload => 9,
        }
    }

    /// All error codes, in numeric order.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::None,
            Self::SensorFailure,
            Self::ActuatorStuck,
            Self::CommunicationLost,
            Self::PowerFluctuation,
            Self::MemoryCorruption,
            Self::WatchdogTimeout,
            Self::InvalidState,
            Self::FileIoError,
            Self::SystemOverload,
        ]
        .into_iter()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::None => write!(f, "none"),
            ErrorCode::SensorFailure => write!(f, "sensor failure"),
            ErrorCode::ActuatorStuck => write!(f, "actuator stuck"),
            ErrorCode::CommunicationLost => write!(f, "communication lost"),
            ErrorCode::PowerFluctuation => write!(f, "power fluctuation"),
            ErrorCode::MemoryCorruption => write!(f, "memory corruption"),
            ErrorCode::WatchdogTimeout => write!(f, "watchdog timeout"),
            ErrorCode::InvalidState => write!(f, "invalid state"),
            ErrorCode::FileIoError => write!(f, "file I/O error"),
            ErrorCode::SystemOverload => write!(f, "system overload"),
        }
    }
}

/// Copy `text` into a bounded string, truncating on a char boundary.
pub(crate) fn bounded<const N: usize>(text: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// A single diagnostic log entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    timestamp: Duration,
    severity: Severity,
    code: ErrorCode,
    message: heapless::String<MESSAGE_CAPACITY>,
    origin: heapless::String<ORIGIN_CAPACITY>,
    line: u32,
}

impl LogEntry {
    /// Create a new entry. Over-long `message` and `origin` are truncated.
    pub fn new(
        timestamp: Duration,
        severity: Severity,
        code: ErrorCode,
        message: &str,
        origin: &str,
        line: u32,
    ) -> Self {
        Self {
            timestamp,
            severity,
            code,
            message: bounded(message),
            origin: bounded(origin),
            line,
        }
    }

    /// Monitor time at which the entry was appended.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Entry severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Associated error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Label of the component that emitted the entry.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Source line of the emitting call site.
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:{} - {}",
            self.severity.label(),
            self.origin,
            self.line,
            self.message
        )
    }
}
