//! HTTP adapters - the inbound webhook endpoint.

pub mod webhook;

pub use webhook::{webhook_router, WebhookAppState};
