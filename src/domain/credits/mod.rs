//! Credits domain module.
//!
//! Turns a verified Stripe checkout into a credit grant for a member.
//!
//! # Module Structure
//!
//! - `webhook_verifier` - Stripe-Signature parsing and HMAC verification
//! - `stripe_event` - Event envelope and type filter
//! - `price_table` - Price id to credit count mapping
//! - `member` - Member snapshot and credit grant arithmetic
//! - `webhook_errors` - Error taxonomy with HTTP status mapping

mod member;
mod price_table;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use member::{CreditGrant, Member};
pub use price_table::{PriceCreditTable, PriceTableError};
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::test_signature_header;
