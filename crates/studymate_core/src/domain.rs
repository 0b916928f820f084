//! crates/studymate_core/src/domain.rs
//!
//! Defines the pure, core data structures for the offline-sync layer.
//! These records are defined by the JSON shape they are stored under, so they
//! derive `Serialize`/`Deserialize` directly and keep the application's
//! camelCase field names on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How long after the last heartbeat a user still counts as online.
pub const PRESENCE_TIMEOUT_MS: i64 = 60_000;

/// A finished quiz attempt owned by the local store until synced.
/// Immutable once created; the identifier is generated on save when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: String,
    pub subject: String,
    pub topic: String,
    /// Arbitrary answer payload as produced by the quiz UI.
    pub answers: Value,
    /// Score as a whole percentage, 0..=100.
    pub score: u32,
    pub completed_at: DateTime<Utc>,
}

/// A lesson snapshot saved explicitly for offline use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineLesson {
    pub lesson_id: String,
    pub lesson_title: String,
    pub subject: String,
    pub topic: String,
    /// Denormalized full lesson content.
    pub content: Value,
    pub saved_at: DateTime<Utc>,
}

/// A quiz attempt buffered locally while offline, waiting for the reconciler.
///
/// `synced` defaults to false and flips to true exactly once; no operation
/// ever resets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineQuizAttempt {
    pub quiz_id: String,
    pub subject: String,
    pub topic: String,
    pub answers: Value,
    pub completed_at: DateTime<Utc>,
    pub synced: bool,
}

// Payment transaction status. Forward-only under normal operation:
// pending -> processing -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    CoinPurchase,
    Subscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionDuration {
    Monthly,
    Annual,
}

/// A mobile-money payment transaction stored locally ahead of backend sync.
///
/// `verified` is always derived from the status (`Completed` implies
/// verified); it is never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub user_id: String,
    pub amount: f64,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coins_awarded: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_duration: Option<SubscriptionDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flutterwave_ref: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated payment figures for one user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionStats {
    pub total_spent: f64,
    pub total_transactions: usize,
    pub successful_transactions: usize,
    pub failed_transactions: usize,
    pub total_coins_purchased: u32,
    pub has_active_subscription: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ChallengeInvite,
    FriendRequest,
    AchievementUnlock,
    SystemMessage,
    ChallengeResult,
}

/// An in-app notification. The read flag is one-way: false -> true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Optional payload, e.g. a challenge or friend identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// A user's presence as derived from the remote heartbeat document.
///
/// `is_online` is computed against a fresh clock read each time; the remote
/// store only ever holds the server-authoritative `lastSeen` timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPresence {
    pub user_id: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub is_online: bool,
}

/// Whether a heartbeat at `last_seen` still counts as online at `now`.
///
/// The boundary is exclusive: a gap of exactly [`PRESENCE_TIMEOUT_MS`] is
/// offline.
pub fn is_user_online(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_seen {
        Some(seen) => (now - seen).num_milliseconds() < PRESENCE_TIMEOUT_MS,
        None => false,
    }
}

/// Locally tracked learning progress: which lessons are done and the scores
/// of every quiz taken.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProgress {
    pub completed_lessons: Vec<String>,
    pub quiz_scores: Vec<u32>,
}

/// Derived progress toward the next promotion level.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionProgress {
    pub challenges_completed: u32,
    pub challenges_required: u32,
    pub challenges_remaining: u32,
    /// Fraction 0..=1.
    pub current_accuracy: f64,
    /// Fraction 0..=1.
    pub accuracy_required: f64,
    /// 0..=100.
    pub progress_percentage: f64,
    pub can_promote: bool,
}

/// Summary metrics over the accumulated local progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSummary {
    pub lessons_completed: usize,
    pub quizzes_taken: usize,
    pub average_quiz_score: u32,
    pub points: u32,
}

// An unlockable achievement shown on the progress screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Outcome of one reconciler run, surfaced to the UI as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
}

impl SyncReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Rough accounting of what the offline store currently holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OfflineStorageInfo {
    pub offline_lessons_count: usize,
    pub total_quizzes_count: usize,
    pub unsynced_quizzes_count: usize,
    pub storage_used_kb: u64,
}
