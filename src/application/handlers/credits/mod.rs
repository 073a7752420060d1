//! Credit grant handlers.

mod handle_checkout_webhook;

pub use handle_checkout_webhook::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
};
