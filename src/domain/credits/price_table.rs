//! Price-to-credits mapping.
//!
//! Maps a Stripe price id to the number of credits one purchase of it
//! grants. The table is built once from configuration and shared read-only.

use std::collections::HashMap;

use thiserror::Error;

use super::webhook_errors::WebhookError;

/// Errors building a price table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceTableError {
    #[error("Price table is empty")]
    Empty,

    #[error("Price ID must not be blank")]
    BlankPriceId,

    #[error("Price {0} maps to zero credits")]
    ZeroCredits(String),
}

/// Immutable price id → credit count table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCreditTable {
    entries: HashMap<String, u32>,
}

impl PriceCreditTable {
    /// Builds a table, rejecting blank ids and zero credit counts so a
    /// purchase can never be credited with nothing.
    pub fn new<I, K>(entries: I) -> Result<Self, PriceTableError>
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        let mut map = HashMap::new();
        for (price_id, credits) in entries {
            let price_id = price_id.into().trim().to_string();
            if price_id.is_empty() {
                return Err(PriceTableError::BlankPriceId);
            }
            if credits == 0 {
                return Err(PriceTableError::ZeroCredits(price_id));
            }
            map.insert(price_id, credits);
        }

        if map.is_empty() {
            return Err(PriceTableError::Empty);
        }

        Ok(Self { entries: map })
    }

    /// Credits granted by one purchase of `price_id`.
    ///
    /// # Errors
    ///
    /// `WebhookError::UnknownPriceId` when the id is not in the table.
    pub fn credits_for(&self, price_id: &str) -> Result<u32, WebhookError> {
        self.entries
            .get(price_id)
            .copied()
            .ok_or_else(|| WebhookError::UnknownPriceId(price_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
