//! Shared helpers for integration tests.

#![allow(dead_code)]

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use wiremock::matchers::{basic_auth, bearer_token, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const STRIPE_API_KEY: &str = "sk_test_integration";
pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const MEMBERSTACK_SECRET: &str = "sk_ms_integration";
pub const CREDIT_FIELD: &str = "extra-credits";

/// Helper to start a mock server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Builds a `Stripe-Signature` header the way Stripe does.
pub fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Serialized Stripe event envelope.
pub fn event_payload(event_id: &str, event_type: &str, session_id: &str) -> String {
    json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": 1_704_067_200,
        "livemode": false,
        "api_version": "2024-06-20",
        "data": {
            "object": {"id": session_id, "object": "checkout.session"}
        }
    })
    .to_string()
}

/// Checkout session as returned with `line_items` and `customer_details`
/// expanded.
pub fn checkout_session(session_id: &str, email: &str, price_id: &str) -> Value {
    json!({
        "id": session_id,
        "object": "checkout.session",
        "mode": "payment",
        "payment_status": "paid",
        "customer_email": null,
        "customer_details": {"email": email, "name": "Test Buyer"},
        "line_items": {
            "object": "list",
            "has_more": false,
            "data": [{
                "id": "li_1",
                "object": "item",
                "quantity": 1,
                "price": {"id": price_id, "object": "price", "unit_amount": 500}
            }]
        }
    })
}

/// Mock for `GET /v1/checkout/sessions/{id}` authenticated with the test key.
pub fn stripe_session_mock(session_id: &str) -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(format!("/v1/checkout/sessions/{}", session_id)))
        .and(basic_auth(STRIPE_API_KEY, ""))
}

/// Mock for `GET /v1/members` authenticated with the test secret.
pub fn memberstack_list_mock() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path("/v1/members"))
        .and(bearer_token(MEMBERSTACK_SECRET))
}

/// Mock for `PATCH /v1/members/{id}` authenticated with the test secret.
pub fn memberstack_patch_mock(member_id: &str) -> MockBuilder {
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/members/{}", member_id)))
        .and(bearer_token(MEMBERSTACK_SECRET))
}

/// Helper to create success response templates
pub fn success_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
