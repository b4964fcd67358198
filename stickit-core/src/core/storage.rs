//! Key-value persistence for the notes record.
//!
//! The board keeps its whole collection in one named record, the way a
//! browser's `localStorage` would hold it. [`KeyValueStore`] is that backend;
//! [`NoteStore`] layers the record codec and the save/load/upsert/delete
//! contract on top of it.

use crate::{Note, StorageError};
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// Name of the record holding every note.
pub const NOTES_KEY: &str = "stickit-notes";

/// Convenience alias for backend results.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A string-keyed, string-valued persistence backend.
///
/// `set` may fail with [`StorageError::QuotaExceeded`] when the backend is out
/// of capacity; callers treat that as recoverable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-memory backend with an optional capacity limit in bytes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    /// Bytes currently held, counted as key length plus value length.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            if self.used_bytes() - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

const SQLITE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);";

/// SQLite-file backend holding records in a single `kv` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates (or reuses) a store file at `path` and ensures the schema exists.
    pub fn create<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SQLITE_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Opens an existing store, rejecting files that are not StickIt stores.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'kv'",
            [],
            |row| row.get(0),
        )?;

        if table_count != 1 {
            return Err(StorageError::InvalidStore(
                "Not a valid StickIt store".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    /// Opens the store at `path`, creating it when the file does not exist yet.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// In-memory database, mainly for tests.
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SQLITE_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Caps the database at `pages` pages; writes beyond that report
    /// [`StorageError::QuotaExceeded`]. SQLite never shrinks the cap below
    /// the current page count. Returns the effective cap.
    pub fn limit_pages(&self, pages: u32) -> StorageResult<u32> {
        let effective = self
            .conn
            .pragma_update_and_check(None, "max_page_count", pages, |row| row.get::<_, u32>(0))?;
        Ok(effective)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn map_write_error(err: rusqlite::Error) -> StorageError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull) => StorageError::QuotaExceeded,
        _ => StorageError::Sqlite(err),
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map_err(map_write_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .map_err(map_write_error)?;
        Ok(())
    }
}

/// The notes record on top of a [`KeyValueStore`].
pub struct NoteStore<S> {
    backend: S,
}

impl<S: KeyValueStore> NoteStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Replaces the stored record with `notes`.
    pub fn save_all(&mut self, notes: &[Note]) -> StorageResult<()> {
        let json = serde_json::to_string(notes)?;
        self.backend.set(NOTES_KEY, &json).map_err(|e| {
            log::error!("failed to save {} notes: {e}", notes.len());
            e
        })
    }

    /// Reads the stored record.
    ///
    /// A missing record is an empty board. A record that does not parse is
    /// removed and also reads as an empty board; only backend failures are
    /// returned as errors.
    pub fn load_all(&mut self) -> StorageResult<Vec<Note>> {
        let Some(raw) = self.backend.get(NOTES_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => Ok(notes),
            Err(e) => {
                log::warn!("discarding corrupt notes record: {e}");
                self.backend.remove(NOTES_KEY)?;
                Ok(Vec::new())
            }
        }
    }

    /// Inserts `note` or replaces the stored note with the same id.
    pub fn save(&mut self, note: &Note) -> StorageResult<()> {
        let mut notes = self.load_all()?;
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note.clone(),
            None => notes.push(note.clone()),
        }
        self.save_all(&notes)
    }

    /// Removes the note with `id`; absent ids leave the record as it was.
    pub fn delete(&mut self, id: &str) -> StorageResult<()> {
        let mut notes = self.load_all()?;
        notes.retain(|n| n.id != id);
        self.save_all(&notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point;
    use crate::NoteColor;
    use tempfile::NamedTempFile;

    fn sample(title: &str, z: u32) -> Note {
        let mut note = Note::new(Point::new(100.0, 120.0), z);
        note.title = title.to_string();
        note
    }

    #[test]
    fn test_save_all_then_load_all_round_trips() {
        let mut store = NoteStore::new(MemoryStore::new());
        let mut a = sample("A", 1);
        a.color = NoteColor::Purple;
        a.content = "line one\nline two".to_string();
        let b = sample("B", 2);

        store.save_all(&[a.clone(), b.clone()]).unwrap();
        let loaded = store.load_all().unwrap();

        assert_eq!(loaded, vec![a, b]);
    }

    #[test]
    fn test_missing_record_loads_empty() {
        let mut store = NoteStore::new(MemoryStore::new());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record_is_cleared() {
        let mut backend = MemoryStore::new();
        backend.set(NOTES_KEY, "{not json").unwrap();
        let mut store = NoteStore::new(backend);

        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.backend().get(NOTES_KEY).unwrap(), None);
    }

    #[test]
    fn test_save_upserts_by_id() {
        let mut store = NoteStore::new(MemoryStore::new());
        let mut a = sample("A", 1);
        store.save(&a).unwrap();
        store.save(&sample("B", 2)).unwrap();

        a.title = "A2".to_string();
        store.save(&a).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "A2");
    }

    #[test]
    fn test_delete_filters_by_id() {
        let mut store = NoteStore::new(MemoryStore::new());
        let a = sample("A", 1);
        let b = sample("B", 2);
        store.save_all(&[a.clone(), b.clone()]).unwrap();

        store.delete(&a.id).unwrap();
        store.delete("missing").unwrap();

        assert_eq!(store.load_all().unwrap(), vec![b]);
    }

    #[test]
    fn test_memory_quota_rejects_large_write() {
        let mut store = NoteStore::new(MemoryStore::with_quota(64));
        let err = store.save(&sample("too big for the quota", 1)).unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_memory_quota_counts_replaced_value_once() {
        let mut backend = MemoryStore::with_quota(10);
        backend.set("k", "12345678").unwrap();
        backend.set("k", "87654321").unwrap();
        assert!(backend.set("k", "123456789012").is_err());
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("87654321"));
    }

    #[test]
    fn test_sqlite_store_round_trip() {
        let temp = NamedTempFile::new().unwrap();
        let a = sample("Persisted", 1);
        {
            let mut store = NoteStore::new(SqliteStore::create(temp.path()).unwrap());
            store.save(&a).unwrap();
        }

        let mut store = NoteStore::new(SqliteStore::open(temp.path()).unwrap());
        assert_eq!(store.load_all().unwrap(), vec![a]);
    }

    #[test]
    fn test_sqlite_open_invalid_store() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "not a database").unwrap();
        assert!(SqliteStore::open(temp.path()).is_err());
    }

    #[test]
    fn test_sqlite_open_foreign_database() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute("CREATE TABLE other (id INTEGER PRIMARY KEY)", [])
                .unwrap();
        }
        let result = SqliteStore::open(temp.path());
        assert!(matches!(result, Err(StorageError::InvalidStore(_))));
    }

    #[test]
    fn test_sqlite_page_limit_reports_quota() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.limit_pages(2).unwrap();

        let big = "x".repeat(256 * 1024);
        let err = store.set("big", &big).unwrap_err();
        assert!(err.is_quota_exceeded());
    }

    #[test]
    fn test_sqlite_remove() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
