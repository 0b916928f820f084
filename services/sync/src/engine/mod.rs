pub mod attempts;
pub mod cell;
pub mod context;
pub mod lessons;
pub mod notifications;
pub mod presence;
pub mod progress;
pub mod sync;
pub mod transactions;

pub use context::{SyncContext, SyncEngine};
pub use presence::{start_presence_heartbeat, PresenceHeartbeat};
pub use sync::SyncReconciler;
