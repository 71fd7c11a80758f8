use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{ClientError, Result};

/// Key-value store for cross-session UI preferences
///
/// Holds only presentation preferences, never thread or message data.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| ClientError::Preferences(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| ClientError::Preferences(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object on disk
pub struct FilePreferences {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl FilePreferences {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            ClientError::Preferences(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .read()
            .map_err(|e| ClientError::Preferences(e.to_string()))?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .write()
            .map_err(|e| ClientError::Preferences(e.to_string()))?;

        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ClientError::Preferences(e.to_string()))?;
            }
        }
        let raw = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, raw).map_err(|e| {
            ClientError::Preferences(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(key, path = %self.path.display(), "Preference saved");
        Ok(())
    }
}
