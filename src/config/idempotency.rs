//! Idempotency configuration

use serde::Deserialize;

use crate::adapters::webhook_store::{
    DEFAULT_CLAIM_LEASE_SECS, DEFAULT_RETENTION_SECS, MAX_RETENTION_SECS,
};

use super::error::ValidationError;

/// Webhook deduplication settings
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// How long a processed event id is remembered, in seconds
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    /// How long an unfinished claim blocks redeliveries before it is
    /// considered abandoned, in seconds
    #[serde(default = "default_claim_lease")]
    pub claim_lease_secs: u64,
}

impl IdempotencyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.retention_secs == 0 || self.retention_secs > MAX_RETENTION_SECS {
            return Err(ValidationError::InvalidRetention);
        }
        if self.claim_lease_secs == 0 || self.claim_lease_secs > self.retention_secs {
            return Err(ValidationError::InvalidClaimLease);
        }
        Ok(())
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention(),
            claim_lease_secs: default_claim_lease(),
        }
    }
}

fn default_retention() -> u64 {
    DEFAULT_RETENTION_SECS
}

fn default_claim_lease() -> u64 {
    DEFAULT_CLAIM_LEASE_SECS
}
