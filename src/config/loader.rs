//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::HostConfig;
use crate::config::validation::validate_options;

/// Errors raised while building a configuration.
///
/// Every variant is fatal: no lifecycle hooks exist until configuration resolves.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed caller-supplied options.
    #[error("css-lifecycles: {0}")]
    InvalidConfiguration(String),

    /// Extracted assets were requested but the build step did not provide them.
    #[error("css-lifecycles: useExtractedAssets requires asset data from the build step")]
    MissingBuildIntegration,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load and validate the host configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HostConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: HostConfig = toml::from_str(&content)?;

    validate_options(&config.css)?;

    Ok(config)
}
