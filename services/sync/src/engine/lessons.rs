//! services/sync/src/engine/lessons.rs
//!
//! The repository for lessons saved explicitly for offline use.

use std::sync::Arc;

use serde_json::Value;
use studymate_core::domain::OfflineLesson;
use studymate_core::ports::{Clock, KeyValueStore, PortResult};

use crate::engine::cell::StorageCell;

/// The fixed storage key for the offline-lesson collection.
pub const OFFLINE_LESSONS_KEY: &str = "offlineLessons";

/// A lesson as handed over by the UI, before the repository stamps it.
#[derive(Debug, Clone)]
pub struct NewOfflineLesson {
    pub lesson_id: String,
    pub lesson_title: String,
    pub subject: String,
    pub topic: String,
    pub content: Value,
}

#[derive(Clone)]
pub struct OfflineLessons {
    cell: StorageCell<Vec<OfflineLesson>>,
    clock: Arc<dyn Clock>,
}

impl OfflineLessons {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cell: StorageCell::new(store, OFFLINE_LESSONS_KEY),
            clock,
        }
    }

    pub fn list(&self) -> Vec<OfflineLesson> {
        self.cell.read()
    }

    /// Saves a lesson snapshot for offline use. Saving a lesson that is
    /// already stored is a no-op.
    pub fn save(&self, lesson: NewOfflineLesson) -> PortResult<()> {
        let saved_at = self.clock.now();
        self.cell.mutate(|lessons| {
            if lessons.iter().any(|l| l.lesson_id == lesson.lesson_id) {
                return;
            }
            lessons.push(OfflineLesson {
                lesson_id: lesson.lesson_id,
                lesson_title: lesson.lesson_title,
                subject: lesson.subject,
                topic: lesson.topic,
                content: lesson.content,
                saved_at,
            });
        })
    }

    pub fn remove(&self, lesson_id: &str) -> PortResult<()> {
        self.cell
            .mutate(|lessons| lessons.retain(|l| l.lesson_id != lesson_id))
    }

    pub fn is_saved(&self, lesson_id: &str) -> bool {
        self.list().iter().any(|l| l.lesson_id == lesson_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::kv::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    struct FixedClock(DateTime<Utc>);
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn repo() -> OfflineLessons {
        OfflineLessons::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap())),
        )
    }

    fn lesson(id: &str) -> NewOfflineLesson {
        NewOfflineLesson {
            lesson_id: id.to_string(),
            lesson_title: "Photosynthesis".to_string(),
            subject: "science".to_string(),
            topic: "biology".to_string(),
            content: json!({"sections": ["intro", "reaction"]}),
        }
    }

    #[test]
    fn saved_lessons_read_back() {
        let repo = repo();
        repo.save(lesson("l1")).expect("save");
        repo.save(lesson("l2")).expect("save");

        let stored = repo.list();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].lesson_id, "l1");
        assert!(repo.is_saved("l2"));
        assert!(!repo.is_saved("l3"));
    }

    #[test]
    fn saving_twice_keeps_a_single_copy() {
        let repo = repo();
        repo.save(lesson("l1")).expect("save");
        repo.save(lesson("l1")).expect("save");
        assert_eq!(repo.list().len(), 1);
    }

    #[test]
    fn remove_is_explicit_and_targeted() {
        let repo = repo();
        repo.save(lesson("l1")).expect("save");
        repo.save(lesson("l2")).expect("save");

        repo.remove("l1").expect("remove");
        assert!(!repo.is_saved("l1"));
        assert!(repo.is_saved("l2"));
    }
}
