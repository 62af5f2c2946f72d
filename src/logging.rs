//! Log setup for the terminal host.
//!
//! The terminal is owned by the UI, so events go to
//! `~/.footprint/footprint.log` instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::error::{Error, Result};

/// Build the filter: `RUST_LOG` wins, then the settings' level.
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global fmt subscriber appending to `path`.
pub fn init_to_file(path: &Path, level: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Install logging into the default config directory.
pub fn init(settings: &Settings) -> Result<()> {
    let dir = Settings::config_dir().ok_or(Error::ConfigDirUnavailable)?;
    init_to_file(&dir.join("footprint.log"), &settings.log_level)
}
