use super::*;
use crate::model::{Board, Layout, Piece, PlacedPiece};

fn sample_entry() -> NewHistoryEntry {
    let piece = Piece::new(20.0, 30.0);
    let layout =
        Layout { placed_pieces: vec![PlacedPiece::place(&piece, 0.0, 0.0, "#f87171")], unplaced_pieces: Vec::new() };
    NewHistoryEntry { board: Board { width: 100.0, height: 100.0 }, pieces: vec![piece], layout }
}

/// Backend whose writes always fail.
struct BrokenBackend;

impl HistoryBackend for BrokenBackend {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        Ok(Vec::new())
    }

    fn save(&self, _entries: &[HistoryEntry]) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: "/nowhere".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}

// =========================================================================
// add / update / remove / clear
// =========================================================================

#[test]
fn add_assigns_id_and_timestamp_newest_first() {
    let mut store = HistoryStore::open(MemoryStore::new());
    let first = store.add(sample_entry());
    let second = store.add(sample_entry());

    assert_ne!(first.id, second.id);
    assert!(OffsetDateTime::parse(&first.timestamp, &Rfc3339).is_ok());
    assert_eq!(store.entries()[0].id, second.id);
    assert_eq!(store.entries()[1].id, first.id);
}

#[test]
fn add_persists_round_trip() {
    let backend = MemoryStore::new();
    let mut store = HistoryStore::open(backend.clone());
    let added = store.add(sample_entry());

    let reloaded = HistoryStore::open(backend);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.entries()[0], added);
}

#[test]
fn update_replaces_matching_entry() {
    let backend = MemoryStore::new();
    let mut store = HistoryStore::open(backend.clone());
    let mut entry = store.add(sample_entry());
    entry.board.width = 250.0;

    assert!(store.update(entry.clone()));
    assert_eq!(store.get(&entry.id).map(|e| e.board.width), Some(250.0));
    assert_eq!(HistoryStore::open(backend).entries()[0].board.width, 250.0);
}

#[test]
fn update_unknown_id_is_noop() {
    let mut store = HistoryStore::open(MemoryStore::new());
    let mut entry = store.add(sample_entry());
    let original = entry.clone();
    entry.id = "missing".into();

    assert!(!store.update(entry));
    assert_eq!(store.entries(), &[original]);
}

#[test]
fn remove_deletes_entry() {
    let mut store = HistoryStore::open(MemoryStore::new());
    let a = store.add(sample_entry());
    let b = store.add(sample_entry());

    assert!(store.remove(&a.id));
    assert_eq!(store.len(), 1);
    assert_eq!(store.entries()[0].id, b.id);
}

#[test]
fn remove_unknown_id_leaves_collection_unchanged() {
    let mut store = HistoryStore::open(MemoryStore::new());
    store.add(sample_entry());
    let before = store.entries().to_vec();

    assert!(!store.remove("does-not-exist"));
    assert_eq!(store.entries(), before.as_slice());
}

#[test]
fn clear_always_empties() {
    let backend = MemoryStore::new();
    let mut store = HistoryStore::open(backend.clone());
    store.clear();
    assert!(store.is_empty());

    for _ in 0..5 {
        store.add(sample_entry());
    }
    store.clear();
    assert!(store.is_empty());
    assert!(HistoryStore::open(backend).is_empty());
}

// =========================================================================
// degraded persistence
// =========================================================================

#[test]
fn corrupt_data_loads_as_empty() {
    let backend = MemoryStore::new();
    backend.set_raw(HISTORY_KEY, "{not json");
    let store = HistoryStore::open(backend);
    assert!(store.is_empty());
}

#[test]
fn save_failure_keeps_in_memory_state() {
    let mut store = HistoryStore::open(BrokenBackend);
    let entry = store.add(sample_entry());
    assert_eq!(store.len(), 1);
    assert_eq!(store.entries()[0].id, entry.id);
}

// =========================================================================
// FileStore
// =========================================================================

#[test]
fn file_store_missing_file_is_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("nested"));
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut history = HistoryStore::open(FileStore::new(dir.path()));
    let added = history.add(sample_entry());

    let path = dir.path().join("layoutHistory.json");
    assert!(path.exists());

    let reloaded = HistoryStore::open(FileStore::new(dir.path()));
    assert_eq!(reloaded.entries(), &[added]);
}

#[test]
fn file_store_corrupt_file_reports_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("layoutHistory.json"), "[{").unwrap();
    let store = FileStore::new(dir.path());
    assert!(matches!(store.load(), Err(StorageError::Corrupt(_))));
    assert!(HistoryStore::open(store).is_empty());
}
