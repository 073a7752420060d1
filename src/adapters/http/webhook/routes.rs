//! Axum router configuration for the webhook endpoint.

use std::time::Duration;

use axum::{routing::post, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::handlers::{handle_stripe_webhook, WebhookAppState};

/// Create the Stripe webhook routes.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks (no auth, signature verified)
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the complete service router, mounted at `/webhooks`, with
/// request tracing and a per-request timeout.
///
/// # Example
///
/// ```ignore
/// let app = webhook_router(WebhookAppState::new(handler), Duration::from_secs(30));
/// axum::serve(listener, app).await?;
/// ```
pub fn webhook_router(state: WebhookAppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
