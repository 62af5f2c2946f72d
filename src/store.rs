use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Read side of the persisted selection state (company/product picks that
/// survive page reloads).
pub trait SelectionStore {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySelectionStore {
    values: HashMap<String, String>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Selection store backed by a JSON object on disk (~/.footprint/selection.json).
///
/// Every `set`/`remove` is written through immediately.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileSelectionStore {
    /// Open the store in the default config directory.
    pub fn open_default() -> Result<Self> {
        let dir = Settings::config_dir().ok_or(Error::ConfigDirUnavailable)?;
        Self::open(dir.join("selection.json"))
    }

    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), entries = values.len(), "selection store opened");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let old = self.values.remove(key);
        if old.is_some() {
            self.save()?;
        }
        Ok(old)
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            warn!(error = %e, "failed to replace selection file");
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl SelectionStore for FileSelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
