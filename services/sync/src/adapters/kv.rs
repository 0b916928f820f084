//! services/sync/src/adapters/kv.rs
//!
//! Implementations of the `KeyValueStore` port: a file-backed store (the
//! persistent-storage analog of the browser's `localStorage`), an in-memory
//! store for tests and embedders, and a no-op store for environments without
//! any persistent storage at all.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use studymate_core::ports::{KeyValueStore, PortError, PortResult};
use tracing::warn;

//=========================================================================================
// JsonFileStore
//=========================================================================================

/// A `KeyValueStore` that persists its whole key/value map as one JSON file.
///
/// The map is loaded once at open and rewritten on every mutation. A write
/// the filesystem refuses (quota, permissions) is surfaced as
/// [`PortError::Storage`] and leaves the in-memory map unchanged, so memory
/// never drifts ahead of disk.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// A corrupt file is treated as empty rather than an error, matching the
    /// fail-safe read contract of the persistence layer.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(
                    code = "malformed_store_file",
                    path = %path.display(),
                    error = %e,
                    "local store file is not valid JSON; starting empty"
                );
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> PortResult<()> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| PortError::Storage(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(&entries) {
            // Roll the map back so a rejected write is not observable.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.remove(key);

        if let Err(e) = self.persist(&entries) {
            if let Some(old) = previous {
                entries.insert(key.to_string(), old);
            }
            return Err(e);
        }
        Ok(())
    }
}

//=========================================================================================
// MemoryStore
//=========================================================================================

/// A purely in-memory `KeyValueStore`, for tests and embedders that manage
/// persistence themselves.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

//=========================================================================================
// NullStore
//=========================================================================================

/// The storage-less environment, made explicit at construction time.
///
/// Every read is empty and every write succeeds without effect, so
/// repositories degrade to no-ops instead of checking for a missing
/// environment inside each operation.
#[derive(Default, Clone, Copy)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> PortResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> PortResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).expect("open");
        store.set("offlineLessons", "[1,2,3]").expect("set");
        assert_eq!(
            store.get("offlineLessons").expect("get"),
            Some("[1,2,3]".to_string())
        );

        // A fresh handle sees what the first one persisted.
        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("offlineLessons").expect("get"),
            Some("[1,2,3]".to_string())
        );
    }

    #[test]
    fn file_store_remove_deletes_the_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path().join("store.json")).expect("open");

        store.set("k", "v").expect("set");
        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
    }

    #[test]
    fn corrupt_store_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json at all").expect("write");

        let store = JsonFileStore::open(&path).expect("open");
        assert_eq!(store.get("anything").expect("get"), None);
    }

    #[test]
    fn null_store_is_a_silent_no_op() {
        let store = NullStore;
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k").expect("get"), None);
        store.remove("k").expect("remove");
    }
}
