//! Monitor configuration loading

use anyhow::{Context, Result};
use faultsim_monitor::MonitorConfig;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_file: Option<PathBuf>,
    pub no_log_file: bool,
}

/// Load the configuration from `path`, or the defaults if none is given.
pub fn load(path: Option<&Path>) -> Result<MonitorConfig> {
    let Some(path) = path else {
        return Ok(MonitorConfig::default());
    };

    let text = fs::read_to_string(path)
        .map_err(|e| CliError::InvalidConfiguration(format!("{}: {e}", path.display())))
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: MonitorConfig = serde_json::from_str(&text)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded monitor configuration");
    Ok(config)
}

/// Load, apply overrides and validate.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<MonitorConfig> {
    let mut config = load(path)?;

    if overrides.no_log_file {
        config.sink_path = None;
    } else if let Some(log_file) = &overrides.log_file {
        config.sink_path = Some(log_file.clone());
    }

    config.validate().map_err(CliError::from)?;
    Ok(config)
}
