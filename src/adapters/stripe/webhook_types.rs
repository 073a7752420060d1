//! Stripe API objects as returned by the checkout session endpoint.
//!
//! Only the fields the bridge reads are modelled; unknown fields are ignored.

use serde::Deserialize;

use crate::ports::{CheckoutSessionDetails, PurchasedItem};

/// Stripe Checkout Session object with `line_items` and `customer_details`
/// expanded.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Details the customer entered at checkout.
    #[serde(default)]
    pub customer_details: Option<StripeCustomerDetails>,

    /// Email passed when the session was created.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Expanded line item list.
    #[serde(default)]
    pub line_items: Option<StripeList<StripeLineItem>>,
}

/// Customer details captured during checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomerDetails {
    pub email: Option<String>,
}

/// Stripe list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

/// One checkout line item.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeLineItem {
    pub price: Option<StripePrice>,
    pub quantity: Option<u32>,
}

/// Price attached to a line item.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

impl From<StripeCheckoutSession> for CheckoutSessionDetails {
    fn from(session: StripeCheckoutSession) -> Self {
        let present = |email: &String| !email.trim().is_empty();
        let customer_email = session
            .customer_details
            .and_then(|details| details.email)
            .filter(present)
            .or_else(|| session.customer_email.filter(present));

        let line_items = session
            .line_items
            .map(|list| list.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                item.price.map(|price| PurchasedItem {
                    price_id: price.id,
                    quantity: item.quantity.unwrap_or(1),
                })
            })
            .collect();

        CheckoutSessionDetails {
            id: session.id,
            customer_email,
            line_items,
        }
    }
}
