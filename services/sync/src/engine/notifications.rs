//! services/sync/src/engine/notifications.rs
//!
//! The in-app notification repository. Mutations that change stored state
//! publish an update event on a broadcast channel so interested components
//! (badge counters, notification panes) can refresh without polling.

use std::sync::Arc;

use serde_json::Value;
use studymate_core::domain::{Notification, NotificationKind};
use studymate_core::ports::{Clock, KeyValueStore, PortResult};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::engine::cell::StorageCell;

/// The fixed storage key for the notification collection.
pub const NOTIFICATIONS_KEY: &str = "inAppNotifications";

/// Published whenever the stored notification set changes.
#[derive(Debug, Clone, Copy)]
pub struct NotificationsChanged;

/// A notification as handed over by the caller; id, read flag and creation
/// time are owned by the repository.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub action_url: Option<String>,
}

#[derive(Clone)]
pub struct Notifications {
    cell: StorageCell<Vec<Notification>>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<NotificationsChanged>,
}

impl Notifications {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            cell: StorageCell::new(store, NOTIFICATIONS_KEY),
            clock,
            events,
        }
    }

    /// Subscribes to change events. Reads never publish; every state-changing
    /// mutation publishes exactly once.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationsChanged> {
        self.events.subscribe()
    }

    pub fn create(&self, new: NewNotification) -> PortResult<Notification> {
        let notification = Notification {
            id: format!("notif-{}", Uuid::new_v4()),
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            data: new.data,
            read: false,
            created_at: self.clock.now(),
            action_url: new.action_url,
        };

        let stored = notification.clone();
        self.cell
            .mutate(move |notifications| notifications.push(stored))?;
        self.publish();
        Ok(notification)
    }

    /// All notifications for one user, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Vec<Notification> {
        let mut notifications: Vec<Notification> = self
            .cell
            .read()
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.list_for_user(user_id)
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Marks one notification read. The read flag is one-way.
    pub fn mark_read(&self, notification_id: &str) -> PortResult<()> {
        let changed = self.cell.mutate(|notifications| {
            match notifications
                .iter_mut()
                .find(|n| n.id == notification_id && !n.read)
            {
                Some(notification) => {
                    notification.read = true;
                    true
                }
                None => false,
            }
        })?;

        if changed {
            self.publish();
        }
        Ok(())
    }

    pub fn mark_all_read(&self, user_id: &str) -> PortResult<()> {
        let changed = self.cell.mutate(|notifications| {
            let mut changed = false;
            for notification in notifications
                .iter_mut()
                .filter(|n| n.user_id == user_id && !n.read)
            {
                notification.read = true;
                changed = true;
            }
            changed
        })?;

        if changed {
            self.publish();
        }
        Ok(())
    }

    pub fn delete(&self, notification_id: &str) -> PortResult<()> {
        let changed = self.cell.mutate(|notifications| {
            let before = notifications.len();
            notifications.retain(|n| n.id != notification_id);
            notifications.len() != before
        })?;

        if changed {
            self.publish();
        }
        Ok(())
    }

    fn publish(&self) {
        // Nobody listening is fine; the event is purely advisory.
        let _ = self.events.send(NotificationsChanged);
    }
}
