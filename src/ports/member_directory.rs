//! Member directory port.
//!
//! The external system that owns member records and their credit balance.
//! The bridge only reads members by email and writes one balance field.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::credits::{Member, WebhookError};

/// Port for the member directory.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Custom field that holds the credit balance. Reads and writes both go
    /// through this name.
    fn credit_field(&self) -> &str;

    /// List members whose email matches. May return several records; the
    /// directory does not guarantee uniqueness.
    async fn find_members_by_email(&self, email: &str) -> Result<Vec<Member>, DirectoryError>;

    /// Overwrite the member's credit balance with `new_balance`.
    async fn patch_member_credits(
        &self,
        member_id: &str,
        new_balance: i64,
    ) -> Result<(), DirectoryError>;
}

/// Errors from member directory operations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Directory request failed: {0}")]
    Network(String),

    #[error("Directory rejected credentials")]
    Unauthorized,

    #[error("Directory returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid directory response: {0}")]
    InvalidResponse(String),

    #[error("Malformed member id: {0:?}")]
    InvalidMemberId(String),
}

impl From<DirectoryError> for WebhookError {
    fn from(err: DirectoryError) -> Self {
        WebhookError::Directory(err.to_string())
    }
}
