//! services/sync/src/engine/transactions.rs
//!
//! The payment transaction store. Transactions are created ahead of the
//! gateway flow, updated as the gateway reports progress, and kept locally
//! until the backend mirrors them.
//!
//! `verified` is never written directly: every status update re-derives it,
//! so a record can only become verified by reaching `Completed`.

use std::sync::Arc;

use studymate_core::domain::{
    TransactionKind, TransactionRecord, TransactionStats, TransactionStatus,
};
use studymate_core::ports::{Clock, KeyValueStore, PortResult};
use tracing::warn;

use crate::engine::cell::StorageCell;

/// The fixed storage key for the transaction collection.
pub const TRANSACTIONS_KEY: &str = "paymentTransactions";

#[derive(Clone)]
pub struct Transactions {
    cell: StorageCell<Vec<TransactionRecord>>,
    clock: Arc<dyn Clock>,
}

impl Transactions {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cell: StorageCell::new(store, TRANSACTIONS_KEY),
            clock,
        }
    }

    /// Creates or replaces the record with the same transaction id,
    /// stamping `updated_at`.
    pub fn store(&self, mut record: TransactionRecord) -> PortResult<()> {
        record.updated_at = self.clock.now();
        self.cell.mutate(move |records| {
            records.retain(|r| r.transaction_id != record.transaction_id);
            records.push(record);
        })
    }

    pub fn get(&self, transaction_id: &str) -> Option<TransactionRecord> {
        self.cell
            .read()
            .into_iter()
            .find(|r| r.transaction_id == transaction_id)
    }

    /// All transactions for one user, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .cell
            .read()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Moves a transaction to `status`, re-deriving `verified` and stamping
    /// `updated_at`. A new gateway reference replaces the stored one; `None`
    /// keeps whatever reference is already there. Unknown ids are skipped
    /// with a warning, matching the advisory nature of the store.
    pub fn update_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
        flutterwave_ref: Option<&str>,
    ) -> PortResult<()> {
        let now = self.clock.now();
        let found = self.cell.mutate(|records| {
            match records
                .iter_mut()
                .find(|r| r.transaction_id == transaction_id)
            {
                Some(record) => {
                    record.status = status;
                    if let Some(reference) = flutterwave_ref {
                        record.flutterwave_ref = Some(reference.to_string());
                    }
                    record.verified = status == TransactionStatus::Completed;
                    record.updated_at = now;
                    true
                }
                None => false,
            }
        })?;

        if !found {
            warn!(
                code = "unknown_transaction",
                transaction_id, "status update for a transaction that is not stored"
            );
        }
        Ok(())
    }

    /// Whether the user already has a live transaction for this package.
    /// Only `Pending` and `Processing` count; settled records never block a
    /// new purchase. Advisory: callers check before creating.
    pub fn has_pending_transaction(
        &self,
        user_id: &str,
        package_id: &str,
        kind: TransactionKind,
    ) -> bool {
        self.list_for_user(user_id).iter().any(|r| {
            r.package_id.as_deref() == Some(package_id)
                && r.kind == kind
                && matches!(
                    r.status,
                    TransactionStatus::Pending | TransactionStatus::Processing
                )
        })
    }

    /// Aggregates the user's payment history for the account screen.
    pub fn stats(&self, user_id: &str) -> TransactionStats {
        let records = self.list_for_user(user_id);
        let successful: Vec<&TransactionRecord> = records
            .iter()
            .filter(|r| r.status == TransactionStatus::Completed)
            .collect();

        TransactionStats {
            total_spent: successful.iter().map(|r| r.amount).sum(),
            total_transactions: records.len(),
            successful_transactions: successful.len(),
            failed_transactions: records
                .iter()
                .filter(|r| r.status == TransactionStatus::Failed)
                .count(),
            total_coins_purchased: successful
                .iter()
                .filter(|r| r.kind == TransactionKind::CoinPurchase)
                .filter_map(|r| r.coins_awarded)
                .sum(),
            has_active_subscription: successful
                .iter()
                .any(|r| r.kind == TransactionKind::Subscription),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::kv::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedClock(DateTime<Utc>);
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn repo() -> Transactions {
        Transactions::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap())),
        )
    }

    fn record(id: &str, status: TransactionStatus, created_secs: i64) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            user_id: "u1".to_string(),
            amount: 10.0,
            status,
            kind: TransactionKind::CoinPurchase,
            package_id: Some("starter".to_string()),
            package_name: Some("Starter Pack".to_string()),
            coins_awarded: Some(100),
            subscription_tier: None,
            subscription_duration: None,
            flutterwave_ref: None,
            verified: false,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
            updated_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn completing_a_transaction_derives_verified_and_keeps_the_reference() {
        let repo = repo();
        repo.store(record("t1", TransactionStatus::Pending, 1_000))
            .expect("store");

        repo.update_status("t1", TransactionStatus::Completed, Some("fw-ref-1"))
            .expect("update");

        let stored = repo.get("t1").expect("stored");
        assert!(stored.verified);
        assert_eq!(stored.flutterwave_ref.as_deref(), Some("fw-ref-1"));

        // A later update without a reference keeps the stored one.
        repo.update_status("t1", TransactionStatus::Completed, None)
            .expect("update");
        let stored = repo.get("t1").expect("stored");
        assert_eq!(stored.flutterwave_ref.as_deref(), Some("fw-ref-1"));
    }

    #[test]
    fn failing_a_transaction_clears_verified() {
        let repo = repo();
        let mut completed = record("t1", TransactionStatus::Completed, 1_000);
        completed.verified = true;
        repo.store(completed).expect("store");

        repo.update_status("t1", TransactionStatus::Failed, None)
            .expect("update");
        let stored = repo.get("t1").expect("stored");
        assert!(!stored.verified);
    }

    #[test]
    fn listing_is_newest_first_and_per_user() {
        let repo = repo();
        repo.store(record("t1", TransactionStatus::Pending, 1_000))
            .expect("store");
        repo.store(record("t2", TransactionStatus::Pending, 3_000))
            .expect("store");
        let mut other = record("t3", TransactionStatus::Pending, 2_000);
        other.user_id = "u2".to_string();
        repo.store(other).expect("store");

        let listed = repo.list_for_user("u1");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].transaction_id, "t2");
        assert_eq!(listed[1].transaction_id, "t1");
    }

    #[test]
    fn only_live_statuses_count_as_pending() {
        let repo = repo();
        repo.store(record("t1", TransactionStatus::Completed, 1_000))
            .expect("store");
        repo.store(record("t2", TransactionStatus::Failed, 2_000))
            .expect("store");
        assert!(!repo.has_pending_transaction("u1", "starter", TransactionKind::CoinPurchase));

        repo.store(record("t3", TransactionStatus::Processing, 3_000))
            .expect("store");
        assert!(repo.has_pending_transaction("u1", "starter", TransactionKind::CoinPurchase));

        // A different package or kind does not match.
        assert!(!repo.has_pending_transaction("u1", "mega", TransactionKind::CoinPurchase));
        assert!(!repo.has_pending_transaction("u1", "starter", TransactionKind::Subscription));
    }

    #[test]
    fn stats_aggregate_only_settled_outcomes() {
        let repo = repo();
        repo.store(record("t1", TransactionStatus::Completed, 1_000))
            .expect("store");
        repo.store(record("t2", TransactionStatus::Failed, 2_000))
            .expect("store");

        let mut subscription = record("t3", TransactionStatus::Completed, 3_000);
        subscription.kind = TransactionKind::Subscription;
        subscription.coins_awarded = None;
        subscription.amount = 25.0;
        repo.store(subscription).expect("store");

        let stats = repo.stats("u1");
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.successful_transactions, 2);
        assert_eq!(stats.failed_transactions, 1);
        assert_eq!(stats.total_spent, 35.0);
        assert_eq!(stats.total_coins_purchased, 100);
        assert!(stats.has_active_subscription);
    }
}
