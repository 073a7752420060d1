//! Member records and the credit grant computed for them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::webhook_errors::WebhookError;

/// A member as held by the external directory.
///
/// The directory is authoritative; this is a request-scoped snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Directory-assigned member id.
    pub id: String,

    /// Primary email address, when the directory returns one.
    #[serde(default)]
    pub email: Option<String>,

    /// Free-form custom fields; the credit balance lives in one of them.
    #[serde(default, rename = "customFields")]
    pub custom_fields: HashMap<String, serde_json::Value>,
}

impl Member {
    /// Current balance stored in `field`.
    ///
    /// Missing, null and non-numeric values read as zero. Numeric strings
    /// are accepted since directories often store custom fields as text.
    pub fn credit_balance(&self, field: &str) -> i64 {
        self.custom_fields
            .get(field)
            .map(parse_credit_value)
            .unwrap_or(0)
    }
}

fn parse_credit_value(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// The balance change applied to one member for one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditGrant {
    pub member_id: String,
    pub previous_balance: i64,
    pub credits_added: u32,
    pub new_balance: i64,
}

impl CreditGrant {
    /// Computes `existing + credits` for `member`.
    ///
    /// # Errors
    ///
    /// `WebhookError::CreditOverflow` if the sum does not fit.
    pub fn compute(member: &Member, field: &str, credits: u32) -> Result<Self, WebhookError> {
        let previous_balance = member.credit_balance(field);
        let new_balance = previous_balance
            .checked_add(i64::from(credits))
            .ok_or(WebhookError::CreditOverflow)?;

        Ok(Self {
            member_id: member.id.clone(),
            previous_balance,
            credits_added: credits,
            new_balance,
        })
    }
}
