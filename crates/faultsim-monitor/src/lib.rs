//! Bounded-resource monitoring and fault recovery for a simulated control loop.
//!
//! This crate records structured diagnostic events, tracks system health,
//! injects synthetic faults and drives a small state machine between normal
//! operation, fault and recovery.
//!
//! # Architecture
//!
//! - **EventLog**: fixed-capacity ring of [`LogEntry`] values, oldest evicted first
//! - **FaultHistory**: saturating table of [`FaultRecord`] values
//! - **HealthTracker**: uptime, CPU/memory gauges and the watchdog window
//! - **FaultInjector**: active fault kind and the counter-based effect throttle
//! - **RecoveryEngine**: deadline-driven exit from the fault state
//! - **MonitorCore**: the aggregate owning all of the above
//!
//! Collaborators interact with the monitor only through [`MonitorPort`].
//!
//! # Memory
//!
//! Entries, fault records and their strings are bounded at compile time with
//! `heapless`; the event log allocates its ring once at construction.
//!
//! # State Machine
//!
//! ```text
//! Init ──start──▶ Running ──Error/Critical entry──▶ Fault
//!                    ▲                                │ attempt_recovery
//!                    └──── hold elapsed ──── Recovery ◀┘
//!
//! any ──shutdown──▶ Shutdown
//! ```
//!
//! # Example
//!
//! ```rust
//! use faultsim_monitor::prelude::*;
//! use core::time::Duration;
//!
//! let config = MonitorConfig::builder()
//!     .without_sink()
//!     .recovery_hold_ms(0)
//!     .build()?;
//! let mut monitor = MonitorCore::open(config)?;
//!
//! monitor.inject(FaultKind::ActuatorFail)?;
//! for _ in 0..20 {
//!     monitor.advance(Duration::from_millis(100));
//!     monitor.tick();
//! }
//! assert_eq!(monitor.state(), SystemState::Fault);
//!
//! let outcome = monitor.attempt_recovery()?;
//! assert!(outcome.is_completed());
//! assert_eq!(monitor.shutdown()?, ShutdownOutcome::Clean);
//! # Ok::<(), MonitorError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod collaborators;
mod command;
mod config;
mod error;
mod event;
mod event_log;
mod fault;
mod health;
mod injector;
mod macros;
mod monitor;
mod port;
mod recovery;
mod report;
mod sink;

pub mod prelude;

pub use collaborators::{
    ActuatorSim, CommLinkSim, PowerMonitorSim, SensorSim, default_collaborators,
};
pub use command::{COMMAND_USAGE, OperatorCommand};
pub use config::{DEFAULT_SINK_PATH, MonitorConfig, MonitorConfigBuilder};
pub use error::{MonitorError, MonitorResult};
pub use event::{ErrorCode, LogEntry, MESSAGE_CAPACITY, ORIGIN_CAPACITY, Severity};
pub use event_log::{DEFAULT_EVENT_LOG_CAPACITY, EventLog};
pub use fault::{
    DESCRIPTION_CAPACITY, FAULT_HISTORY_CAPACITY, FaultEffect, FaultHistory, FaultKind,
    FaultRecord,
};
pub use health::{
    DEFAULT_WATCHDOG_TIMEOUT, GaugeBand, GaugeSource, HealthFinding, HealthLimits,
    HealthSnapshot, HealthTracker, RandomGauges, SystemState, WatchdogWindow,
};
pub use injector::{DEFAULT_EFFECT_LOG_INTERVAL, DEFAULT_EFFECT_TICK_DIVISOR, FaultInjector};
pub use monitor::{MirrorCallback, MonitorCore, ShutdownOutcome, TickSummary};
pub use port::{Collaborator, MonitorPort};
pub use recovery::{DEFAULT_RECOVERY_HOLD, RecoveryEngine, RecoveryOutcome, RecoveryStatus};
pub use report::DiagnosticReport;
pub use sink::{LogSink, TextSink, format_entry};

#[cfg(test)]
mod tests;
