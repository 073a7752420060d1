//! WebhookEventRepository port - Interface for tracking processed Stripe webhooks.
//!
//! Stripe may deliver the same event more than once (timeouts, 5xx
//! responses, lost acknowledgements). Granting credits is not idempotent on
//! its own, so every grant is keyed by the Stripe event id.
//!
//! ## Claim Protocol
//!
//! 1. `claim` inserts an in-progress record; only one caller gets `Inserted`
//! 2. On success the winner calls `mark_completed`
//! 3. On failure the winner calls `release` so a redelivery can try again
//!
//! A delivery that finds the event `InProgress` must answer with a retryable
//! status: the winner may still fail and release. Only `Completed` means the
//! grant is applied. An in-progress claim older than the store's lease is
//! treated as abandoned and can be claimed again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::credits::WebhookError;

/// Processing state of a claimed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Claimed; the grant is being applied.
    InProgress,
    /// The grant was applied.
    Completed,
}

/// Record of a claimed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Stripe event ID (evt_xxx format).
    pub event_id: String,

    /// Type of Stripe event (e.g., "checkout.session.completed").
    pub event_type: String,

    /// When the event was claimed.
    pub claimed_at: DateTime<Utc>,

    /// Current processing state.
    pub status: ProcessingStatus,

    /// Summary of the applied grant, once completed.
    pub outcome: Option<String>,
}

impl WebhookEventRecord {
    /// Creates a new in-progress record.
    pub fn in_progress(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            claimed_at: Utc::now(),
            status: ProcessingStatus::InProgress,
            outcome: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProcessingStatus::Completed
    }
}

/// Result of attempting to claim a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event, or an abandoned
    /// claim was taken over).
    Inserted,
    /// Another delivery holds a live claim and has not finished yet.
    InProgress,
    /// The event was already processed successfully.
    Completed,
}

/// Errors from the event store.
#[derive(Debug, Clone, Error)]
#[error("Webhook event store error: {0}")]
pub struct StoreError(pub String);

impl From<StoreError> for WebhookError {
    fn from(err: StoreError) -> Self {
        WebhookError::Storage(err.0)
    }
}

/// Port for claiming and completing webhook events.
///
/// `claim` must be atomic: of any number of concurrent callers with the
/// same event id, exactly one sees `SaveResult::Inserted`.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Find a previously claimed event by its Stripe event ID.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, StoreError>;

    /// Attempt to claim an event for processing.
    async fn claim(&self, record: WebhookEventRecord) -> Result<SaveResult, StoreError>;

    /// Mark a claimed event as completed with a summary of the outcome.
    async fn mark_completed(&self, event_id: &str, outcome: String) -> Result<(), StoreError>;

    /// Drop an in-progress claim after a failed attempt.
    async fn release(&self, event_id: &str) -> Result<(), StoreError>;
}
