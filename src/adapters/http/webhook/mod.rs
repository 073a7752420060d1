//! HTTP adapter for the Stripe webhook endpoint.

mod handlers;
mod routes;

pub use handlers::{handle_stripe_webhook, WebhookApiError, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
