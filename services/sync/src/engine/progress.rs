//! services/sync/src/engine/progress.rs
//!
//! Tracks which lessons the user has completed and every quiz score, and
//! derives the summary figures through the pure calculators in the core
//! crate.

use std::sync::Arc;

use studymate_core::domain::{Achievement, ProgressSummary, StoredProgress};
use studymate_core::ports::{KeyValueStore, PortResult};
use studymate_core::progress;

use crate::engine::cell::StorageCell;

/// The fixed storage key for the accumulated progress record.
pub const USER_PROGRESS_KEY: &str = "userProgress";

#[derive(Clone)]
pub struct ProgressTracker {
    cell: StorageCell<StoredProgress>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            cell: StorageCell::new(store, USER_PROGRESS_KEY),
        }
    }

    /// Records a lesson as completed. Completing it again is a no-op.
    pub fn mark_lesson_complete(&self, lesson_id: &str) -> PortResult<()> {
        self.cell.mutate(|stored| {
            if !stored.completed_lessons.iter().any(|l| l == lesson_id) {
                stored.completed_lessons.push(lesson_id.to_string());
            }
        })
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.cell
            .read()
            .completed_lessons
            .iter()
            .any(|l| l == lesson_id)
    }

    /// Appends a quiz score (whole percentage) to the history.
    pub fn record_quiz_score(&self, score: u32) -> PortResult<()> {
        self.cell.mutate(|stored| stored.quiz_scores.push(score))
    }

    pub fn summary(&self) -> ProgressSummary {
        progress::summarize(&self.cell.read())
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        progress::achievements(&self.summary())
    }
}
