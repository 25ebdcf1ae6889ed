//! Error types for monitor operations.
//!
//! Diagnostic error codes carried on log entries live in [`crate::ErrorCode`];
//! this module covers failures of the monitor API itself.

use crate::SystemState;
use thiserror::Error;

/// Monitor operation errors.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A state transition not permitted by the state machine was requested.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// State the monitor was in.
        from: SystemState,
        /// State that was requested.
        to: SystemState,
    },

    /// A state assertion did not hold.
    #[error("Expected state {expected}, got {actual}")]
    StateAssertion {
        /// State the caller expected.
        expected: SystemState,
        /// State the monitor was actually in.
        actual: SystemState,
    },

    /// The monitor has already been shut down.
    #[error("Monitor has been shut down")]
    ShutDown,

}

impl MonitorError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Check if the monitor can keep serving after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StateAssertion { .. } | Self::InvalidTransition { .. }
        )
    }
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
