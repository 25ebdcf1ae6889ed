//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! # Example
//!
//! ```rust
//! use faultsim_monitor::prelude::*;
//! ```

pub use crate::{
    Collaborator, DiagnosticReport, ErrorCode, EventLog, FaultHistory, FaultKind, FaultRecord,
    GaugeBand, GaugeSource, HealthSnapshot, LogEntry, LogSink, MonitorConfig, MonitorCore,
    MonitorError, MonitorPort, MonitorResult, OperatorCommand, RandomGauges, RecoveryOutcome,
    Severity, ShutdownOutcome, SystemState, TextSink, TickSummary,
};
