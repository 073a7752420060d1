//! In-memory webhook event repository.
//!
//! Tracks claimed Stripe event ids in a HashMap guarded by a tokio RwLock.
//! Records older than the retention window are pruned on each claim. An
//! in-progress claim older than the lease is taken over by the next claim.
//! State is process-local and lost on restart.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{
    ProcessingStatus, SaveResult, StoreError, WebhookEventRecord, WebhookEventRepository,
};

/// Default retention for claimed events (one day).
pub const DEFAULT_RETENTION_SECS: u64 = 86_400;

/// Upper bound on retention (30 days).
pub const MAX_RETENTION_SECS: u64 = 30 * 86_400;

/// Default lease on an unfinished claim (five minutes).
pub const DEFAULT_CLAIM_LEASE_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct InMemoryWebhookEventRepository {
    records: Arc<RwLock<HashMap<String, WebhookEventRecord>>>,
    retention: Duration,
    claim_lease: Duration,
}

impl InMemoryWebhookEventRepository {
    pub fn new(retention_secs: u64) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            retention: Duration::seconds(retention_secs.min(MAX_RETENTION_SECS) as i64),
            claim_lease: Duration::seconds(DEFAULT_CLAIM_LEASE_SECS as i64),
        }
    }

    /// Set how long an in-progress claim blocks other deliveries.
    pub fn with_claim_lease_secs(mut self, lease_secs: u64) -> Self {
        self.claim_lease = Duration::seconds(lease_secs.min(MAX_RETENTION_SECS) as i64);
        self
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryWebhookEventRepository {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_SECS)
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, StoreError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn claim(&self, record: WebhookEventRecord) -> Result<SaveResult, StoreError> {
        let mut records = self.records.write().await;

        let now = Utc::now();
        if let Some(cutoff) = now.checked_sub_signed(self.retention) {
            records.retain(|_, existing| existing.claimed_at >= cutoff);
        }

        if let Some(existing) = records.get(&record.event_id) {
            if existing.is_completed() {
                return Ok(SaveResult::Completed);
            }
            if now.signed_duration_since(existing.claimed_at) < self.claim_lease {
                return Ok(SaveResult::InProgress);
            }
            tracing::warn!(
                event_id = %record.event_id,
                claimed_at = %existing.claimed_at,
                "Taking over abandoned webhook claim"
            );
        }

        records.insert(record.event_id.clone(), record);
        Ok(SaveResult::Inserted)
    }

    async fn mark_completed(&self, event_id: &str, outcome: String) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(event_id)
            .ok_or_else(|| StoreError(format!("No claim held for event {}", event_id)))?;

        record.status = ProcessingStatus::Completed;
        record.outcome = Some(outcome);
        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get(event_id) {
            if record.status == ProcessingStatus::InProgress {
                records.remove(event_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event_id: &str) -> WebhookEventRecord {
        WebhookEventRecord::in_progress(event_id, "checkout.session.completed")
    }

    #[tokio::test]
    async fn first_claim_is_inserted() {
        let repo = InMemoryWebhookEventRepository::default();

        let result = repo.claim(record("evt_1")).await.unwrap();

        assert_eq!(result, SaveResult::Inserted);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn claim_during_processing_reports_in_progress() {
        let repo = InMemoryWebhookEventRepository::default();
        repo.claim(record("evt_1")).await.unwrap();

        let result = repo.claim(record("evt_1")).await.unwrap();

        assert_eq!(result, SaveResult::InProgress);
    }

    #[tokio::test]
    async fn claim_after_completion_reports_completed() {
        let repo = InMemoryWebhookEventRepository::default();
        repo.claim(record("evt_1")).await.unwrap();
        repo.mark_completed("evt_1", "done".to_string()).await.unwrap();

        let result = repo.claim(record("evt_1")).await.unwrap();

        assert_eq!(result, SaveResult::Completed);
    }

    #[tokio::test]
    async fn abandoned_claim_is_taken_over_after_lease() {
        let repo = InMemoryWebhookEventRepository::default().with_claim_lease_secs(60);
        let mut stale = record("evt_1");
        stale.claimed_at = Utc::now() - Duration::seconds(120);
        repo.claim(stale).await.unwrap();

        let result = repo.claim(record("evt_1")).await.unwrap();

        assert_eq!(result, SaveResult::Inserted);
        let stored = repo.find_by_event_id("evt_1").await.unwrap().unwrap();
        assert!(Utc::now() - stored.claimed_at < Duration::seconds(60));
    }

    #[tokio::test]
    async fn completed_record_is_kept_past_lease() {
        let repo = InMemoryWebhookEventRepository::default().with_claim_lease_secs(60);
        let mut old = record("evt_1");
        old.claimed_at = Utc::now() - Duration::seconds(120);
        repo.claim(old).await.unwrap();
        repo.mark_completed("evt_1", "done".to_string()).await.unwrap();

        assert_eq!(repo.claim(record("evt_1")).await.unwrap(), SaveResult::Completed);
    }

    #[tokio::test]
    async fn mark_completed_records_outcome() {
        let repo = InMemoryWebhookEventRepository::default();
        repo.claim(record("evt_1")).await.unwrap();

        repo.mark_completed("evt_1", "2 -> 5".to_string())
            .await
            .unwrap();

        let stored = repo.find_by_event_id("evt_1").await.unwrap().unwrap();
        assert!(stored.is_completed());
        assert_eq!(stored.outcome.as_deref(), Some("2 -> 5"));
    }

    #[tokio::test]
    async fn mark_completed_without_claim_fails() {
        let repo = InMemoryWebhookEventRepository::default();
        assert!(repo.mark_completed("evt_missing", String::new()).await.is_err());
    }

    #[tokio::test]
    async fn release_allows_reclaim() {
        let repo = InMemoryWebhookEventRepository::default();
        repo.claim(record("evt_1")).await.unwrap();

        repo.release("evt_1").await.unwrap();

        assert!(repo.is_empty().await);
        assert_eq!(repo.claim(record("evt_1")).await.unwrap(), SaveResult::Inserted);
    }

    #[tokio::test]
    async fn release_keeps_completed_records() {
        let repo = InMemoryWebhookEventRepository::default();
        repo.claim(record("evt_1")).await.unwrap();
        repo.mark_completed("evt_1", "done".to_string()).await.unwrap();

        repo.release("evt_1").await.unwrap();

        assert_eq!(repo.claim(record("evt_1")).await.unwrap(), SaveResult::Completed);
    }

    #[tokio::test]
    async fn expired_records_are_pruned_on_claim() {
        let repo = InMemoryWebhookEventRepository::new(60);
        let mut old = record("evt_old");
        old.claimed_at = Utc::now() - Duration::seconds(120);
        repo.claim(old).await.unwrap();

        repo.claim(record("evt_new")).await.unwrap();

        assert!(repo.find_by_event_id("evt_old").await.unwrap().is_none());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_claims_have_single_winner() {
        let repo = InMemoryWebhookEventRepository::default();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.claim(record("evt_race")).await.unwrap() })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() == SaveResult::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
    }
}
