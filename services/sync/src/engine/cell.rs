//! services/sync/src/engine/cell.rs
//!
//! A typed view over one key of the local `KeyValueStore`. Every logical
//! collection in the layer is one JSON value under one fixed key, and every
//! mutation is a read-modify-write of that whole value.
//!
//! The cell owns a per-key mutex held across the whole read-modify-write, so
//! two interleaved mutations of the same collection can never lose an
//! update. Cells clone cheaply and share the lock; the engine creates
//! exactly one cell per storage key.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use studymate_core::ports::{KeyValueStore, PortError, PortResult};
use tracing::warn;

pub struct StorageCell<T> {
    inner: Arc<CellInner>,
    _marker: PhantomData<fn() -> T>,
}

struct CellInner {
    key: &'static str,
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl<T> Clone for StorageCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<T> StorageCell<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            inner: Arc::new(CellInner {
                key,
                store,
                lock: Mutex::new(()),
            }),
            _marker: PhantomData,
        }
    }

    /// Reads the current value. A missing or malformed stored payload reads
    /// as `T::default()` — never an error to the caller.
    pub fn read(&self) -> T {
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    /// Applies `f` to the current value and writes the result back, all
    /// under the cell's lock. A refused write (quota) propagates to the
    /// caller and leaves the stored value untouched.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> PortResult<R> {
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut value = self.load();
        let result = f(&mut value);

        let raw =
            serde_json::to_string(&value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.inner.store.set(self.inner.key, &raw)?;

        Ok(result)
    }

    /// Drops the key entirely.
    pub fn clear(&self) -> PortResult<()> {
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.store.remove(self.inner.key)
    }

    fn load(&self) -> T {
        match self.inner.store.get(self.inner.key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(
                    code = "malformed_collection",
                    key = self.inner.key,
                    error = %e,
                    "stored collection is not valid JSON; treating as empty"
                );
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(
                    code = "storage_read_failed",
                    key = self.inner.key,
                    error = %e,
                    "could not read stored collection; treating as empty"
                );
                T::default()
            }
        }
    }
}
