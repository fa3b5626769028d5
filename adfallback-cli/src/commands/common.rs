//! Helpers shared across CLI commands.

use std::fs;
use std::path::Path;

use adfallback::{AdSize, RawConfig};

use crate::error::CliError;

/// Read and parse a configuration file without validating it.
pub fn read_config(path: &Path) -> Result<RawConfig, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = RawConfig::from_json(&json).map_err(adfallback::ConfigError::from)?;
    Ok(raw)
}

/// `970x90, 728x90, ...`
pub fn format_sizes(sizes: &[AdSize]) -> String {
    sizes
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
