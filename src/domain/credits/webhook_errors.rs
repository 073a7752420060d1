//! Webhook error types for credit grant processing.
//!
//! Defines every failure the checkout webhook pipeline can hit, with the
//! HTTP status code Stripe should see for each.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request carried no Stripe-Signature header.
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the configured tolerance.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A test-mode event reached an endpoint that requires live mode.
    #[error("Test mode events are not accepted")]
    TestModeRejected,

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The checkout session has no purchaser email.
    #[error("No customer email on session")]
    MissingEmail,

    /// The checkout session has no line items.
    #[error("No line items on session")]
    MissingLineItem,

    /// The purchased price is not in the price-to-credits table.
    #[error("Unknown price ID: {0}")]
    UnknownPriceId(String),

    /// No member in the directory matches the purchaser email.
    #[error("No member found for {0}")]
    MemberNotFound(String),

    /// Adding the credits would overflow the balance.
    #[error("Credit balance overflow")]
    CreditOverflow,

    /// Payment provider call failed.
    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    /// Member directory call failed.
    #[error("Member directory error: {0}")]
    Directory(String),

    /// Processed-event store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Another delivery of the same event holds the claim.
    #[error("Event {0} is still being processed")]
    ProcessingInProgress(String),

    /// The background processing task panicked or was aborted.
    #[error("Processing task failed: {0}")]
    Task(String),
}

impl WebhookError {
    /// True for failures of stage one: the request could not be authenticated
    /// or parsed, so nothing downstream ran.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::ParseError(_)
                | WebhookError::TestModeRejected
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 400: the request itself is bad
    /// - 409: a concurrent delivery is still running, Stripe will redeliver
    /// - 500: processing failed, Stripe will redeliver
    pub fn status_code(&self) -> StatusCode {
        if self.is_verification_failure() {
            StatusCode::BAD_REQUEST
        } else if matches!(self, WebhookError::ProcessingInProgress(_)) {
            StatusCode::CONFLICT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn unknown_price_id_displays_the_id() {
        let err = WebhookError::UnknownPriceId("price_nope".to_string());
        assert_eq!(format!("{}", err), "Unknown price ID: price_nope");
    }

    #[test]
    fn member_not_found_displays_email() {
        let err = WebhookError::MemberNotFound("a@b.com".to_string());
        assert_eq!(format!("{}", err), "No member found for a@b.com");
    }

    #[test]
    fn missing_email_displays_correctly() {
        assert_eq!(
            format!("{}", WebhookError::MissingEmail),
            "No customer email on session"
        );
    }

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Parse error: invalid JSON");
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verification_failures_return_bad_request() {
        let errors = [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
            WebhookError::ParseError("bad".to_string()),
            WebhookError::TestModeRejected,
        ];

        for err in errors {
            assert!(err.is_verification_failure(), "{err}");
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{err}");
        }
    }

    #[test]
    fn business_failures_return_internal_error() {
        let errors = [
            WebhookError::MissingField("data.object.id"),
            WebhookError::MissingEmail,
            WebhookError::MissingLineItem,
            WebhookError::UnknownPriceId("price_x".to_string()),
            WebhookError::MemberNotFound("x@y.z".to_string()),
            WebhookError::CreditOverflow,
            WebhookError::PaymentProvider("timeout".to_string()),
            WebhookError::Directory("503".to_string()),
            WebhookError::Storage("poisoned".to_string()),
            WebhookError::Task("panicked".to_string()),
        ];

        for err in errors {
            assert!(!err.is_verification_failure(), "{err}");
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{err}");
        }
    }

    #[test]
    fn concurrent_delivery_returns_conflict() {
        let err = WebhookError::ProcessingInProgress("evt_1".to_string());
        assert!(!err.is_verification_failure());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
