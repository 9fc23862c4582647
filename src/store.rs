//! Durable local key-value store
//!
//! Persistence seam for the rate cache and favorites list. All values are
//! JSON-encoded strings under string keys, so any backend that can hold a
//! string map works: the file-backed store here, the in-memory store for
//! tests, or a future server-side store, without changing call sites.

use crate::error::{ConverterError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// String-keyed persistence backend.
///
/// Readers must treat malformed stored values as absent; writers persist
/// on every put. A single logical writer is assumed, so no locking.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, persisting immediately
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

/// A store handle that can be cloned across the components sharing one
/// backing store (rate cache and favorites both persist into the same
/// file). The mutex exists for shared ownership; there is still a single
/// logical writer.
impl<S: KeyValueStore> KeyValueStore for Arc<Mutex<S>> {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().unwrap().get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.lock().unwrap().put(key, value)
    }
}

/// Volatile in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one JSON object per store, rewritten on every put.
///
/// Survives process restart. A missing or malformed file reads as an empty
/// store; corruption is logged and dropped, never propagated.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`, loading any existing contents
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path);
        Self { path, entries }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return HashMap::new(),
        };

        match Self::decode(&text) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Discarding malformed store file {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn decode(text: &str) -> Result<HashMap<String, String>> {
        serde_json::from_str(text).map_err(|e| ConverterError::Parse(e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("currencies"), None);

        store.put("currencies", "[\"USD\",\"EUR\"]").unwrap();
        assert_eq!(store.get("currencies").unwrap(), "[\"USD\",\"EUR\"]");
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path);
        store.put("favorites", "[]").unwrap();
        store.put("ratesTimestamp", "1700000000000").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("favorites").unwrap(), "[]");
        assert_eq!(reopened.get("ratesTimestamp").unwrap(), "1700000000000");
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path);
        store.put("ratesTimestamp", "1").unwrap();
        store.put("ratesTimestamp", "2").unwrap();

        assert_eq!(store.get("ratesTimestamp").unwrap(), "2");
    }

    #[test]
    fn test_corrupt_file_decodes_to_parse_error() {
        let result = FileStore::decode("not json at all {{{");
        assert!(matches!(result, Err(ConverterError::Parse(_))));
    }

    #[test]
    fn test_malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all {{{").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("favorites"), None);
    }

    #[test]
    fn test_shared_handles_see_each_others_writes() {
        let shared = Arc::new(Mutex::new(MemoryStore::new()));
        let mut writer = Arc::clone(&shared);
        let reader = Arc::clone(&shared);

        writer.put("favorites", "[]").unwrap();
        assert_eq!(reader.get("favorites").unwrap(), "[]");
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.get("currencies"), None);
    }
}
