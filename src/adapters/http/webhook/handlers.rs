//! HTTP handler for Stripe webhook deliveries.
//!
//! Responses are plain text; Stripe only looks at the status code, the body
//! is for humans reading the dashboard's delivery log.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::application::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
};
use crate::domain::credits::WebhookError;

/// Header carrying Stripe's signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook endpoint.
///
/// The handler is shared rather than built per request: it owns the
/// per-purchaser locks.
#[derive(Clone)]
pub struct WebhookAppState {
    pub handler: Arc<HandleCheckoutWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(handler: HandleCheckoutWebhookHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/stripe - Handle Stripe webhook events
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let cmd = HandleCheckoutWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let body = match state.handler.handle(cmd).await? {
        HandleCheckoutWebhookResult::CreditsGranted { .. } => "Success",
        HandleCheckoutWebhookResult::Ignored { .. } => "Ignoring event type",
        HandleCheckoutWebhookResult::AlreadyProcessed { .. } => "Already processed",
    };

    Ok((StatusCode::OK, body).into_response())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = if self.0.is_verification_failure() {
            tracing::warn!(error = %self.0, "Stripe signature verification failed");
            format!("Webhook Error: {}", self.0)
        } else if matches!(self.0, WebhookError::ProcessingInProgress(_)) {
            "Processing in progress".to_string()
        } else {
            format!("Internal Error: {}", self.0)
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn verification_failure_maps_to_400_webhook_error() {
        let response = WebhookApiError(WebhookError::InvalidSignature).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Webhook Error: Invalid signature");
    }

    #[tokio::test]
    async fn business_failure_maps_to_500_internal_error() {
        let response =
            WebhookApiError(WebhookError::UnknownPriceId("price_x".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "Internal Error: Unknown price ID: price_x"
        );
    }

    #[tokio::test]
    async fn concurrent_delivery_maps_to_409() {
        let response =
            WebhookApiError(WebhookError::ProcessingInProgress("evt_1".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_text(response).await, "Processing in progress");
    }

    #[tokio::test]
    async fn missing_email_message_is_preserved() {
        let response = WebhookApiError(WebhookError::MissingEmail).into_response();

        assert_eq!(
            body_text(response).await,
            "Internal Error: No customer email on session"
        );
    }

    #[tokio::test]
    async fn error_responses_are_plain_text() {
        let response = WebhookApiError(WebhookError::MissingSignature).into_response();

        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}
