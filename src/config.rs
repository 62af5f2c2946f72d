use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::keybindings::KeybindingsConfig;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pixels_per_column() -> u32 {
    8
}

/// Application settings (~/.footprint/settings.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Per-action key overrides. Actions left out keep their defaults.
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Terminal host: logical pixels per terminal column
    #[serde(default = "default_pixels_per_column")]
    pub pixels_per_column: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            keybindings: KeybindingsConfig::default(),
            log_level: default_log_level(),
            pixels_per_column: default_pixels_per_column(),
        }
    }
}

impl Settings {
    /// Returns the config directory path (~/.footprint)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".footprint"))
    }

    /// Returns the config file path (~/.footprint/settings.json)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    /// Loads settings, falling back to defaults if missing or invalid
    pub fn load() -> Self {
        match Self::load_with_error() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    /// Loads settings from the default config path. A missing file yields defaults.
    pub fn load_with_error() -> Result<Self> {
        let path = Self::config_path().ok_or(Error::ConfigDirUnavailable)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves settings to the default config path
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir().ok_or(Error::ConfigDirUnavailable)?;
        self.save_to(&dir.join("settings.json"))
    }

    /// Atomic write: temp file first, then rename
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
                }
            }
        }
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
