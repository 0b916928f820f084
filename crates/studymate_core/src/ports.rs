//! crates/studymate_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the offline-sync layer.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete storage backends and of the
//! environment it is embedded in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The local persistent store refused a write (e.g. quota exceeded).
    #[error("Local storage failure: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The field set of one remote document.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// String-keyed persistent storage of JSON-encoded values — the local
/// counterpart of the browser's `localStorage`.
///
/// All operations are synchronous and non-suspending. Capacity is finite and
/// unspecified; `set` surfaces a refused write as [`PortError::Storage`]
/// instead of failing silently.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

/// The remote document database that synced records end up in.
#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Creates or fully replaces the document's fields.
    async fn write(&self, collection: &str, id: &str, fields: FieldMap) -> PortResult<()>;

    /// Merges `fields` into an existing document.
    /// Returns [`PortError::NotFound`] when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: FieldMap) -> PortResult<()>;

    /// Reads a document's fields.
    /// Returns [`PortError::NotFound`] when the document does not exist.
    async fn read(&self, collection: &str, id: &str) -> PortResult<FieldMap>;

    /// Deletes a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> PortResult<()>;

    /// Upserts `field` on the document with a server-assigned timestamp,
    /// so presence never depends on the client clock.
    async fn touch(&self, collection: &str, id: &str, field: &str) -> PortResult<()>;
}

/// A boolean "is this device online" oracle, consulted synchronously by the
/// reconciler before it attempts any remote operation.
pub trait ConnectivityProbe: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Wall-clock reads, injected so that timestamping and presence derivation
/// are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
