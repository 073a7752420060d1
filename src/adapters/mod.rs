//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Inbound Stripe webhook endpoint (axum)
//! - `stripe` - Stripe signature verification and session lookup
//! - `memberstack` - Member lookup and credit field writes
//! - `webhook_store` - In-memory processed-event tracking

pub mod http;
pub mod memberstack;
pub mod stripe;
pub mod webhook_store;

pub use memberstack::{MemberstackConfig, MemberstackDirectory};
pub use stripe::{StripeConfig, StripePaymentAdapter};
pub use webhook_store::InMemoryWebhookEventRepository;
