//! Key-value preference store.
//!
//! The file-backed store reads its file once, serves `get` from memory and
//! writes the whole map back on every `put`.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::StoreError;

pub const PREF_API_KEY: &str = "weather.api.key";
pub const PREF_REFRESH_INTERVAL_SECS: &str = "autoRefreshIntervalSeconds";
pub const PREF_AUTO_REFRESH: &str = "autoRefresh";

/// String preferences consumed by the dashboard and the refresh scheduler.
pub trait PreferenceStore: Send + Sync + Debug {
    fn get(&self, key: &str, default: &str) -> String;

    /// Store a value. Callers treat failures as non-fatal.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Preferences persisted as a flat JSON object.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store, reading the file if present.
    ///
    /// A missing file yields an empty store. A corrupt file is logged and
    /// replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences: {}", e);
                BTreeMap::new()
            }
        };
        tracing::debug!("Loaded {} preferences from {}", values.len(), path.display());

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|e| StoreError::Format {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::io(&self.path, e))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str, default: &str) -> String {
        self.values
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }
}

/// In-memory preferences, never persisted.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str, default: &str) -> String {
        self.values
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
