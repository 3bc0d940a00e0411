//! History store: persisted list of past calculations.
//!
//! DESIGN
//! ======
//! The store owns the entry collection (newest first) and an injected
//! [`HistoryBackend`]. Every mutation rewrites the whole collection.
//!
//! ERROR HANDLING
//! ==============
//! Persistence is best-effort. A failed load degrades to an empty history
//! and a failed save keeps the in-memory state; both are logged, neither is
//! propagated to the caller.

pub mod storage;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::model::{HistoryEntry, NewHistoryEntry};
pub use storage::{FileStore, HISTORY_KEY, HistoryBackend, MemoryStore, StorageError};

pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    backend: Box<dyn HistoryBackend>,
}

impl HistoryStore {
    /// Load the persisted collection from `backend`.
    pub fn open(backend: impl HistoryBackend + 'static) -> Self {
        let entries = match backend.load() {
            Ok(entries) => {
                info!(count = entries.len(), "history: loaded");
                entries
            }
            Err(StorageError::Corrupt(e)) => {
                warn!(error = %e, "history: stored data unreadable, starting empty");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "history: load failed, starting empty");
                Vec::new()
            }
        };
        Self { entries, backend: Box::new(backend) }
    }

    /// Entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a new calculation at the head of the history.
    pub fn add(&mut self, entry: NewHistoryEntry) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: now_timestamp(),
            board: entry.board,
            pieces: entry.pieces,
            layout: entry.layout,
        };
        self.entries.insert(0, entry.clone());
        info!(id = %entry.id, count = self.entries.len(), "history: entry added");
        self.persist();
        entry
    }

    /// Replace the entry with the same id. Returns `false` if absent.
    pub fn update(&mut self, entry: HistoryEntry) -> bool {
        let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) else {
            return false;
        };
        *slot = entry;
        self.persist();
        true
    }

    /// Delete the entry with `id`. Returns `false` if absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.backend.save(&self.entries) {
            error!(error = %e, count = self.entries.len(), "history: save failed");
        }
    }
}

/// Current UTC time as RFC 3339.
fn now_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    match now.format(&Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            warn!(error = %e, "history: timestamp format failed");
            now.unix_timestamp().to_string()
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
