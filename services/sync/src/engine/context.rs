//! services/sync/src/engine/context.rs
//!
//! Defines the engine's shared context and the assembled engine itself.

use std::sync::Arc;

use studymate_core::ports::{Clock, ConnectivityProbe, KeyValueStore, RemoteDocumentStore};

use crate::config::Config;
use crate::engine::attempts::{OfflineQuizAttempts, QuizAttempts};
use crate::engine::lessons::OfflineLessons;
use crate::engine::notifications::Notifications;
use crate::engine::progress::ProgressTracker;
use crate::engine::sync::SyncReconciler;
use crate::engine::transactions::Transactions;

//=========================================================================================
// SyncContext (Shared Collaborators)
//=========================================================================================

/// The injected platform capabilities, created once at startup and shared by
/// every component. Choosing the adapters here is what distinguishes a
/// storage-less environment from a persistent one — components never probe
/// the environment themselves.
#[derive(Clone)]
pub struct SyncContext {
    pub storage: Arc<dyn KeyValueStore>,
    pub remote: Arc<dyn RemoteDocumentStore>,
    pub connectivity: Arc<dyn ConnectivityProbe>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

//=========================================================================================
// SyncEngine (Assembled Repositories + Reconciler)
//=========================================================================================

/// The fully wired offline-sync layer, exposed to the UI as plain
/// repositories plus the reconciler.
///
/// Exactly one engine exists per storage backend: repositories share their
/// per-collection locks through it, which is what serializes interleaved
/// writes to the same key.
#[derive(Clone)]
pub struct SyncEngine {
    pub quiz_attempts: QuizAttempts,
    pub offline_attempts: OfflineQuizAttempts,
    pub lessons: OfflineLessons,
    pub notifications: Notifications,
    pub transactions: Transactions,
    pub progress: ProgressTracker,
    pub reconciler: SyncReconciler,
}

impl SyncEngine {
    pub fn new(ctx: &SyncContext) -> Self {
        let quiz_attempts = QuizAttempts::new(ctx.storage.clone(), ctx.clock.clone());
        let offline_attempts = OfflineQuizAttempts::new(ctx.storage.clone(), ctx.clock.clone());
        let lessons = OfflineLessons::new(ctx.storage.clone(), ctx.clock.clone());
        let notifications = Notifications::new(ctx.storage.clone(), ctx.clock.clone());
        let transactions = Transactions::new(ctx.storage.clone(), ctx.clock.clone());
        let progress = ProgressTracker::new(ctx.storage.clone());
        let reconciler = SyncReconciler::new(
            offline_attempts.clone(),
            lessons.clone(),
            ctx.remote.clone(),
            ctx.connectivity.clone(),
        );

        Self {
            quiz_attempts,
            offline_attempts,
            lessons,
            notifications,
            transactions,
            progress,
            reconciler,
        }
    }
}
