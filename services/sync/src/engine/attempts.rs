//! services/sync/src/engine/attempts.rs
//!
//! The repositories for quiz attempts: the plain local attempt history and
//! the offline attempt buffer the reconciler drains toward the remote store.

use std::sync::Arc;

use serde_json::Value;
use studymate_core::domain::{OfflineQuizAttempt, QuizAttempt};
use studymate_core::ports::{Clock, KeyValueStore, PortResult};
use uuid::Uuid;

use crate::engine::cell::StorageCell;

/// The fixed storage key for the local attempt history.
pub const QUIZ_ATTEMPTS_KEY: &str = "userQuizAttempts";
/// The fixed storage key for the offline attempt buffer.
pub const OFFLINE_ATTEMPTS_KEY: &str = "offlineQuizAttempts";

//=========================================================================================
// Local Attempt History
//=========================================================================================

/// An attempt as handed over by the quiz UI. The identifier is optional;
/// the repository generates one when absent.
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub id: Option<String>,
    pub subject: String,
    pub topic: String,
    pub answers: Value,
    pub score: u32,
}

#[derive(Clone)]
pub struct QuizAttempts {
    cell: StorageCell<Vec<QuizAttempt>>,
    clock: Arc<dyn Clock>,
}

impl QuizAttempts {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cell: StorageCell::new(store, QUIZ_ATTEMPTS_KEY),
            clock,
        }
    }

    pub fn list(&self) -> Vec<QuizAttempt> {
        self.cell.read()
    }

    /// Appends an attempt to the history and returns the stored record.
    pub fn save(&self, attempt: NewQuizAttempt) -> PortResult<QuizAttempt> {
        let stored = QuizAttempt {
            id: attempt
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            subject: attempt.subject,
            topic: attempt.topic,
            answers: attempt.answers,
            score: attempt.score,
            completed_at: self.clock.now(),
        };

        let record = stored.clone();
        self.cell.mutate(move |attempts| attempts.push(stored))?;
        Ok(record)
    }

    pub fn remove(&self, id: &str) -> PortResult<()> {
        self.cell.mutate(|attempts| attempts.retain(|a| a.id != id))
    }

    /// Drops the whole history key.
    pub fn clear(&self) -> PortResult<()> {
        self.cell.clear()
    }
}

//=========================================================================================
// Offline Attempt Buffer
//=========================================================================================

/// An offline attempt before the repository stamps it. `synced` always
/// starts false.
#[derive(Debug, Clone)]
pub struct NewOfflineQuizAttempt {
    pub quiz_id: String,
    pub subject: String,
    pub topic: String,
    pub answers: Value,
}

#[derive(Clone)]
pub struct OfflineQuizAttempts {
    cell: StorageCell<Vec<OfflineQuizAttempt>>,
    clock: Arc<dyn Clock>,
}

impl OfflineQuizAttempts {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cell: StorageCell::new(store, OFFLINE_ATTEMPTS_KEY),
            clock,
        }
    }

    pub fn list(&self) -> Vec<OfflineQuizAttempt> {
        self.cell.read()
    }

    pub fn save(&self, attempt: NewOfflineQuizAttempt) -> PortResult<()> {
        let completed_at = self.clock.now();
        self.cell.mutate(move |attempts| {
            attempts.push(OfflineQuizAttempt {
                quiz_id: attempt.quiz_id,
                subject: attempt.subject,
                topic: attempt.topic,
                answers: attempt.answers,
                completed_at,
                synced: false,
            });
        })
    }

    /// The attempts still waiting to be mirrored to the remote store.
    pub fn unsynced(&self) -> Vec<OfflineQuizAttempt> {
        self.list().into_iter().filter(|a| !a.synced).collect()
    }

    /// Flips the attempt's `synced` flag to true. The flag is one-way; this
    /// is the only operation that touches it.
    pub fn mark_synced(&self, quiz_id: &str) -> PortResult<()> {
        self.cell.mutate(|attempts| {
            if let Some(attempt) = attempts.iter_mut().find(|a| a.quiz_id == quiz_id) {
                attempt.synced = true;
            }
        })
    }
}
