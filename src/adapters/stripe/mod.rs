//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port: webhook signature verification
//! and checkout session retrieval.
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod stripe_adapter;
mod webhook_types;

pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
pub use webhook_types::{
    StripeCheckoutSession, StripeCustomerDetails, StripeLineItem, StripeList, StripePrice,
};
