//! services/sync/src/engine/sync.rs
//!
//! The sync reconciler: migrates locally-buffered quiz attempts to the
//! remote store once connectivity is available, marking each one synced as
//! it lands.
//!
//! The batch is deliberately not atomic. Each attempt's `synced` flag flips
//! as soon as that attempt is persisted remotely; a failure later in the
//! batch reports the whole call as failed but never rolls those flags back.
//! Re-running the reconciler is always safe (at-least-once delivery).

use std::sync::Arc;

use studymate_core::domain::{OfflineQuizAttempt, OfflineStorageInfo, SyncReport};
use studymate_core::ports::{ConnectivityProbe, PortError, PortResult, RemoteDocumentStore};
use tracing::{debug, info, warn};

use crate::engine::attempts::OfflineQuizAttempts;
use crate::engine::lessons::OfflineLessons;

/// The remote collection synced attempts are written to.
pub const QUIZ_ATTEMPTS_COLLECTION: &str = "quizAttempts";

#[derive(Clone)]
pub struct SyncReconciler {
    attempts: OfflineQuizAttempts,
    lessons: OfflineLessons,
    remote: Arc<dyn RemoteDocumentStore>,
    connectivity: Arc<dyn ConnectivityProbe>,
}

impl SyncReconciler {
    pub fn new(
        attempts: OfflineQuizAttempts,
        lessons: OfflineLessons,
        remote: Arc<dyn RemoteDocumentStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            attempts,
            lessons,
            remote,
            connectivity,
        }
    }

    /// Pushes every unsynced offline attempt to the remote store.
    ///
    /// Offline: fails immediately without touching anything. Nothing
    /// buffered: succeeds without side effects. Otherwise the number of
    /// migrated attempts is reported.
    pub async fn sync_offline_data(&self) -> SyncReport {
        if !self.connectivity.is_online() {
            debug!("cannot sync: device is offline");
            return SyncReport::failure("Device is offline");
        }

        let unsynced = self.attempts.unsynced();
        if unsynced.is_empty() {
            return SyncReport::success("Nothing to sync");
        }

        let mut migrated = 0usize;
        for attempt in &unsynced {
            if let Err(e) = self.push_attempt(attempt).await {
                warn!(
                    code = "sync_push_failed",
                    quiz_id = %attempt.quiz_id,
                    error = %e,
                    "sync aborted; already-migrated attempts stay synced"
                );
                return SyncReport::failure("Sync failed");
            }
            if let Err(e) = self.attempts.mark_synced(&attempt.quiz_id) {
                warn!(
                    code = "sync_mark_failed",
                    quiz_id = %attempt.quiz_id,
                    error = %e,
                    "attempt persisted remotely but could not be marked locally"
                );
                return SyncReport::failure("Sync failed");
            }
            migrated += 1;
        }

        info!(migrated, "offline quiz attempts synced");
        SyncReport::success(format!("Synced {} quiz attempt(s)", migrated))
    }

    async fn push_attempt(&self, attempt: &OfflineQuizAttempt) -> PortResult<()> {
        let value = serde_json::to_value(attempt)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let mut fields = match value {
            serde_json::Value::Object(map) => map,
            _ => return Err(PortError::Unexpected("attempt is not a JSON object".into())),
        };
        // The synced flag is local bookkeeping; the remote copy never
        // carries it.
        fields.remove("synced");

        self.remote
            .write(QUIZ_ATTEMPTS_COLLECTION, &attempt.quiz_id, fields)
            .await
    }

    /// What the offline store currently holds, with a rough size estimate.
    pub fn offline_storage_info(&self) -> OfflineStorageInfo {
        let lessons = self.lessons.list();
        let attempts = self.attempts.list();
        let unsynced_quizzes_count = attempts.iter().filter(|a| !a.synced).count();

        let bytes = serde_json::to_string(&lessons).map(|s| s.len()).unwrap_or(0)
            + serde_json::to_string(&attempts).map(|s| s.len()).unwrap_or(0);

        OfflineStorageInfo {
            offline_lessons_count: lessons.len(),
            total_quizzes_count: attempts.len(),
            unsynced_quizzes_count,
            storage_used_kb: (bytes as f64 / 1024.0).round() as u64,
        }
    }
}
