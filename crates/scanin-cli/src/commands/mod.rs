//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use scanin_core::ScaninConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scanin")
        .join("config.json")
}

/// Load the config given on the command line, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ScaninConfig> {
    if let Some(path) = config_path {
        return Ok(ScaninConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(ScaninConfig::from_file(&default_path)?)
    } else {
        Ok(ScaninConfig::default())
    }
}
