//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod credits;

pub use credits::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
};
