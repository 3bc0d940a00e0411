//! Key-value persistence backends for the history store.
//!
//! `FileStore` keeps one JSON document per key in a directory; writes go
//! through a temp file and a rename so a crash never leaves a torn file.
//! `MemoryStore` is a shared map used by tests and ephemeral runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::model::HistoryEntry;

/// Storage key for the persisted history collection.
pub const HISTORY_KEY: &str = "layoutHistory";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored history is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl crate::error::ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_STORAGE_IO",
            Self::Corrupt(_) => "E_STORAGE_CORRUPT",
        }
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Durable home of the history collection.
pub trait HistoryBackend: Send + Sync {
    /// Load the persisted collection. Missing data is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the data cannot be read or decoded.
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError>;

    /// Replace the persisted collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the data cannot be written.
    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Directory-backed key-value store, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    key: String,
}

impl FileStore {
    /// History store rooted at `dir`, using [`HISTORY_KEY`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_key(dir, HISTORY_KEY)
    }

    pub fn with_key(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self { dir: dir.into(), key: key.to_owned() }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io { path: path.to_path_buf(), source }
    }
}

impl HistoryBackend for FileStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let path = self.path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_string(entries)?;
        std::fs::write(&tmp, raw).map_err(|e| Self::io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory key-value store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text for `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    /// Overwrite the raw stored text for `key`.
    pub fn set_raw(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
    }
}

impl HistoryBackend for MemoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        match self.raw(HISTORY_KEY) {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        self.set_raw(HISTORY_KEY, &raw);
        Ok(())
    }
}
