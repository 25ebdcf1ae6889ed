//! Single-key operator commands.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Usage hint shown for unknown keys.
pub const COMMAND_USAGE: &str = "Unknown command. Use: f, r, d, q";

/// Operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorCommand {
    /// Inject a fault (`f`).
    InjectFault,
    /// Attempt recovery (`r`).
    AttemptRecovery,
    /// Print a diagnostic report (`d`).
    Diagnostics,
    /// Shut down (`q`).
    Quit,
}

impl OperatorCommand {
    /// Parse a key. Case-insensitive.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'f' => Some(Self::InjectFault),
            'r' => Some(Self::AttemptRecovery),
            'd' => Some(Self::Diagnostics),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    /// Key bound to this command.
    pub fn key(&self) -> char {
        match self {
            Self::InjectFault => 'f',
            Self::AttemptRecovery => 'r',
            Self::Diagnostics => 'd',
            Self::Quit => 'q',
        }
    }
}

impl fmt::Display for OperatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InjectFault => write!(f, "inject fault"),
            Self::AttemptRecovery => write!(f, "attempt recovery"),
            Self::Diagnostics => write!(f, "diagnostics"),
            Self::Quit => write!(f, "quit"),
        }
    }
}
