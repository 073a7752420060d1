//! Member directory configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::payment::is_http_url;

/// Member directory configuration (Memberstack)
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Memberstack admin secret key
    #[serde(default)]
    pub memberstack_secret: String,

    /// Memberstack API base URL
    #[serde(default = "default_memberstack_api_base_url")]
    pub memberstack_api_base_url: String,

    /// Custom field that holds the credit balance
    #[serde(default = "default_credit_field")]
    pub credit_field: String,
}

impl DirectoryConfig {
    /// Validate directory configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.memberstack_secret.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "directory.memberstack_secret",
            ));
        }
        if self.credit_field.trim().is_empty() {
            return Err(ValidationError::MissingRequired("directory.credit_field"));
        }
        if !is_http_url(&self.memberstack_api_base_url) {
            return Err(ValidationError::InvalidBaseUrl(
                "directory.memberstack_api_base_url",
            ));
        }
        Ok(())
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            memberstack_secret: String::new(),
            memberstack_api_base_url: default_memberstack_api_base_url(),
            credit_field: default_credit_field(),
        }
    }
}

fn default_memberstack_api_base_url() -> String {
    "https://api.memberstack.com".to_string()
}

fn default_credit_field() -> String {
    "extra-credits".to_string()
}
