//! services/sync/src/engine/presence.rs
//!
//! User presence: a periodic heartbeat that stamps a server-assigned
//! `lastSeen` timestamp on the user's remote document, and a read path that
//! derives online/offline from that timestamp against a fresh clock read.
//!
//! Heartbeat writes are fire-and-forget: presence is best-effort, so
//! failures are logged and swallowed, never surfaced to the caller.

use std::sync::Arc;
use std::time::Duration;

use studymate_core::domain::{is_user_online, UserPresence};
use studymate_core::ports::{Clock, PortError, RemoteDocumentStore};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The remote collection presence documents live in.
pub const STUDENTS_COLLECTION: &str = "students";
/// How often the heartbeat stamps `lastSeen`. Must stay shorter than the
/// presence timeout window.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

const LAST_SEEN_FIELD: &str = "lastSeen";

/// Stamps the user's `lastSeen` with a server-assigned timestamp.
pub async fn update_user_presence(remote: &dyn RemoteDocumentStore, user_id: &str) {
    if let Err(e) = remote.touch(STUDENTS_COLLECTION, user_id, LAST_SEEN_FIELD).await {
        warn!(
            code = "presence_write_failed",
            user_id,
            error = %e,
            "failed to update user presence"
        );
    }
}

/// Reads the user's presence document and derives the online flag.
/// Returns `None` when the user has no presence document (or the read
/// failed — presence stays best-effort on the read path too).
pub async fn get_user_presence(
    remote: &dyn RemoteDocumentStore,
    clock: &dyn Clock,
    user_id: &str,
) -> Option<UserPresence> {
    let fields = match remote.read(STUDENTS_COLLECTION, user_id).await {
        Ok(fields) => fields,
        Err(PortError::NotFound(_)) => return None,
        Err(e) => {
            warn!(
                code = "presence_read_failed",
                user_id,
                error = %e,
                "failed to read user presence"
            );
            return None;
        }
    };

    let last_seen = fields
        .get(LAST_SEEN_FIELD)
        .and_then(|v| v.as_str())
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc));

    Some(UserPresence {
        user_id: user_id.to_string(),
        last_seen,
        is_online: is_user_online(last_seen, clock.now()),
    })
}

/// A running heartbeat. Dropping the handle does NOT stop the task; call
/// [`PresenceHeartbeat::stop`] for deterministic teardown.
pub struct PresenceHeartbeat {
    token: CancellationToken,
    foreground: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PresenceHeartbeat {
    /// Signals that the application returned to the foreground; the
    /// heartbeat writes immediately instead of waiting for the next tick.
    pub fn notify_foreground(&self) {
        self.foreground.notify_one();
    }

    /// Stops the heartbeat: cancels the task and waits for it to finish,
    /// so no timer or listener lingers afterwards.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(code = "presence_task_join", error = %e, "heartbeat task ended abnormally");
        }
    }
}

/// Starts the presence heartbeat for `user_id`: one write immediately, then
/// one per interval tick and one per foreground notification, until stopped.
pub fn start_presence_heartbeat(
    remote: Arc<dyn RemoteDocumentStore>,
    user_id: String,
) -> PresenceHeartbeat {
    let token = CancellationToken::new();
    let foreground = Arc::new(Notify::new());

    let task_token = token.clone();
    let task_foreground = Arc::clone(&foreground);
    let task = tokio::spawn(async move {
        // The first tick of an interval completes immediately, which doubles
        // as the initial "user is here" write.
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!(%user_id, "presence heartbeat stopped");
                    break;
                }
                _ = ticker.tick() => {
                    update_user_presence(remote.as_ref(), &user_id).await;
                }
                _ = task_foreground.notified() => {
                    update_user_presence(remote.as_ref(), &user_id).await;
                }
            }
        }
    });

    PresenceHeartbeat {
        token,
        foreground,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;
    use studymate_core::ports::{FieldMap, PortResult};

    struct FixedClock(DateTime<Utc>);
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Records every touch; optionally fails each one to prove the
    /// fire-and-forget contract.
    #[derive(Default)]
    struct RecordingRemote {
        touches: Mutex<Vec<String>>,
        fail_touches: bool,
        document: Option<FieldMap>,
    }

    impl RecordingRemote {
        fn touch_count(&self) -> usize {
            self.touches.lock().expect("touch lock").len()
        }
    }

    #[async_trait]
    impl RemoteDocumentStore for RecordingRemote {
        async fn write(&self, _c: &str, _id: &str, _f: FieldMap) -> PortResult<()> {
            Ok(())
        }
        async fn update(&self, _c: &str, _id: &str, _f: FieldMap) -> PortResult<()> {
            Ok(())
        }
        async fn read(&self, _c: &str, id: &str) -> PortResult<FieldMap> {
            self.document
                .clone()
                .ok_or_else(|| PortError::NotFound(id.to_string()))
        }
        async fn delete(&self, _c: &str, _id: &str) -> PortResult<()> {
            Ok(())
        }
        async fn touch(&self, _c: &str, id: &str, _field: &str) -> PortResult<()> {
            self.touches.lock().expect("touch lock").push(id.to_string());
            if self.fail_touches {
                Err(PortError::Unexpected("remote store down".into()))
            } else {
                Ok(())
            }
        }
    }

    async fn settle() {
        // Let the spawned heartbeat task process whatever is ready.
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_writes_immediately_then_per_tick() {
        let remote = Arc::new(RecordingRemote::default());
        let heartbeat = start_presence_heartbeat(remote.clone(), "u1".into());

        settle().await;
        assert_eq!(remote.touch_count(), 1);

        tokio::time::sleep(HEARTBEAT_INTERVAL + Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(remote.touch_count(), 2);

        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn foreground_notification_triggers_an_extra_write() {
        let remote = Arc::new(RecordingRemote::default());
        let heartbeat = start_presence_heartbeat(remote.clone(), "u1".into());
        settle().await;
        assert_eq!(remote.touch_count(), 1);

        heartbeat.notify_foreground();
        settle().await;
        assert_eq!(remote.touch_count(), 2);

        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_tears_the_heartbeat_down_for_good() {
        let remote = Arc::new(RecordingRemote::default());
        let heartbeat = start_presence_heartbeat(remote.clone(), "u1".into());
        settle().await;

        heartbeat.stop().await;
        let count = remote.touch_count();

        tokio::time::sleep(HEARTBEAT_INTERVAL * 4).await;
        settle().await;
        assert_eq!(remote.touch_count(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_survives_remote_failures() {
        let remote = Arc::new(RecordingRemote {
            fail_touches: true,
            ..RecordingRemote::default()
        });
        let heartbeat = start_presence_heartbeat(remote.clone(), "u1".into());

        settle().await;
        tokio::time::sleep(HEARTBEAT_INTERVAL + Duration::from_millis(10)).await;
        settle().await;
        // Still ticking: failures are swallowed, not fatal.
        assert_eq!(remote.touch_count(), 2);

        heartbeat.stop().await;
    }

    #[tokio::test]
    async fn presence_derives_online_from_last_seen() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let clock = FixedClock(now);

        let mut fields = FieldMap::new();
        let seen = now - chrono::Duration::milliseconds(30_000);
        fields.insert(
            "lastSeen".into(),
            serde_json::Value::String(seen.to_rfc3339()),
        );
        let remote = RecordingRemote {
            document: Some(fields),
            ..RecordingRemote::default()
        };

        let presence = get_user_presence(&remote, &clock, "u1")
            .await
            .expect("presence");
        assert!(presence.is_online);
        assert_eq!(presence.last_seen, Some(seen));
    }

    #[tokio::test]
    async fn missing_presence_document_reads_as_none() {
        let clock = FixedClock(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        let remote = RecordingRemote::default();
        assert!(get_user_presence(&remote, &clock, "ghost").await.is_none());
    }
}
