//! services/sync/src/lib.rs
//!
//! The offline-sync layer of the StudyMate learning application: typed
//! repositories over a local key-value store, a reconciler that migrates
//! buffered records to the remote document store, and the presence
//! heartbeat.

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
