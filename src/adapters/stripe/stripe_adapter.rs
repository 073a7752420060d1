//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port: webhook verification is delegated
//! to the domain verifier, checkout sessions are read over the REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::credits::{
    StripeEvent, StripeWebhookVerifier, WebhookError, DEFAULT_TOLERANCE_SECS,
};
use crate::ports::{CheckoutSessionDetails, PaymentError, PaymentErrorCode, PaymentProvider};

use super::webhook_types::StripeCheckoutSession;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Maximum accepted webhook age in seconds.
    tolerance_secs: i64,

    /// Whether to require livemode events.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the webhook timestamp tolerance.
    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.expose_secret().clone())
            .with_tolerance_secs(config.tolerance_secs)
            .with_require_livemode(config.require_livemode);

        Self {
            config,
            verifier,
            http_client: reqwest::Client::new(),
        }
    }

    fn session_url(&self, session_id: &str) -> Result<String, PaymentError> {
        // Stripe ids are [A-Za-z0-9_]; anything else would alter the path.
        if session_id.is_empty()
            || !session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Malformed checkout session id: {:?}", session_id),
            ));
        }

        Ok(format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        ))
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    fn verify_and_parse_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let event = self.verifier.verify_and_parse(payload, signature)?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Webhook signature verified"
        );

        Ok(event)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionDetails, PaymentError> {
        let url = self.session_url(session_id)?;

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&[("expand[]", "line_items"), ("expand[]", "customer_details")])
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::not_found("Checkout session"));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                session_id,
                status = status.as_u16(),
                error = %error_text,
                "Stripe retrieve_checkout_session failed"
            );
            let code = match status {
                reqwest::StatusCode::UNAUTHORIZED => PaymentErrorCode::AuthenticationError,
                reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
                _ => PaymentErrorCode::ProviderError,
            };
            return Err(PaymentError::new(
                code,
                format!("Stripe API error: {}", error_text),
            ));
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::InvalidResponse,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        Ok(session.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credits::test_signature_header;

    fn test_config() -> StripeConfig {
        StripeConfig::new("sk_test_key", "whsec_test_secret")
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("api_key", "webhook_secret");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.tolerance_secs, 300);
        assert!(!config.require_livemode);
    }

    #[test]
    fn config_with_base_url_strips_trailing_slash() {
        let config = test_config().with_base_url("http://localhost:8080/");
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn config_with_require_livemode() {
        let config = test_config().with_require_livemode(true);
        assert!(config.require_livemode);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Session URL Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn session_url_uses_base() {
        let adapter = StripePaymentAdapter::new(test_config().with_base_url("http://stripe.local"));
        assert_eq!(
            adapter.session_url("cs_test_a1B2").unwrap(),
            "http://stripe.local/v1/checkout/sessions/cs_test_a1B2"
        );
    }

    #[test]
    fn session_url_rejects_path_characters() {
        let adapter = StripePaymentAdapter::new(test_config());
        assert!(adapter.session_url("cs_1/../customers").is_err());
        assert!(adapter.session_url("").is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn verify_and_parse_event_uses_configured_secret() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_1","type":"checkout.session.completed","created":1704067200,"data":{"object":{"id":"cs_1"}},"livemode":false}"#;
        let header = test_signature_header(
            "whsec_test_secret",
            chrono::Utc::now().timestamp(),
            payload,
        );

        let event = adapter
            .verify_and_parse_event(payload.as_bytes(), &header)
            .unwrap();

        assert_eq!(event.id, "evt_1");
    }

    #[test]
    fn verify_and_parse_event_honours_livemode_requirement() {
        let adapter = StripePaymentAdapter::new(test_config().with_require_livemode(true));
        let payload = r#"{"id":"evt_1","type":"checkout.session.completed","created":1704067200,"data":{"object":{}},"livemode":false}"#;
        let header = test_signature_header(
            "whsec_test_secret",
            chrono::Utc::now().timestamp(),
            payload,
        );

        let result = adapter.verify_and_parse_event(payload.as_bytes(), &header);

        assert!(matches!(result, Err(WebhookError::TestModeRejected)));
    }

    #[test]
    fn verify_and_parse_event_rejects_malformed_header() {
        let adapter = StripePaymentAdapter::new(test_config());
        let result = adapter.verify_and_parse_event(b"{}", "malformed_header");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }
}
