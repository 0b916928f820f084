pub mod domain;
pub mod ports;
pub mod progress;

pub use domain::{
    is_user_online, Achievement, Notification, NotificationKind, OfflineLesson,
    OfflineQuizAttempt, OfflineStorageInfo, ProgressSummary, PromotionProgress, QuizAttempt,
    StoredProgress, SubscriptionDuration, SubscriptionTier, SyncReport, TransactionKind,
    TransactionRecord, TransactionStats, TransactionStatus, UserPresence, PRESENCE_TIMEOUT_MS,
};
pub use ports::{
    Clock, ConnectivityProbe, FieldMap, KeyValueStore, PortError, PortResult,
    RemoteDocumentStore,
};
