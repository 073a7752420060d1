//! Webhook event store adapters.

mod in_memory;

pub use in_memory::{
    InMemoryWebhookEventRepository, DEFAULT_CLAIM_LEASE_SECS, DEFAULT_RETENTION_SECS,
    MAX_RETENTION_SECS,
};
