//! Error types for the faultsim CLI

use faultsim_monitor::MonitorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("System shut down with unresolved faults")]
    UnresolvedFaults,

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::UnresolvedFaults => 2,
            CliError::InvalidConfiguration(_)
            | CliError::JsonError(_)
            | CliError::Monitor(MonitorError::InvalidConfiguration(_)) => 4,
            _ => 1,
        }
    }

    /// Short type name used in JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::InvalidConfiguration(_) => "invalid_configuration",
            CliError::UnresolvedFaults => "unresolved_faults",
            CliError::Monitor(_) => "monitor",
            CliError::Terminal(_) => "terminal",
            CliError::JsonError(_) => "json",
        }
    }
}
