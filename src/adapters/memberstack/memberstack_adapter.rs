//! Memberstack admin API client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::domain::credits::Member;
use crate::ports::{DirectoryError, MemberDirectory};

const DEFAULT_API_BASE_URL: &str = "https://api.memberstack.com";
const DEFAULT_CREDIT_FIELD: &str = "extra-credits";

/// Memberstack API configuration.
#[derive(Clone)]
pub struct MemberstackConfig {
    /// Admin secret key, sent as a bearer token.
    secret: SecretString,

    /// Base URL for the Memberstack API.
    api_base_url: String,

    /// Custom field holding the credit balance.
    credit_field: String,
}

impl MemberstackConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credit_field: DEFAULT_CREDIT_FIELD.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_credit_field(mut self, field: impl Into<String>) -> Self {
        self.credit_field = field.into();
        self
    }

    pub fn credit_field(&self) -> &str {
        &self.credit_field
    }
}

/// List endpoint payload. Older API versions return a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MembersResponse {
    Bare(Vec<Member>),
    Envelope { data: Vec<Member> },
}

impl MembersResponse {
    fn into_members(self) -> Vec<Member> {
        match self {
            MembersResponse::Bare(members) => members,
            MembersResponse::Envelope { data } => data,
        }
    }
}

/// Member directory backed by Memberstack.
pub struct MemberstackDirectory {
    config: MemberstackConfig,
    http_client: reqwest::Client,
}

impl MemberstackDirectory {
    pub fn new(config: MemberstackConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn members_url(&self) -> String {
        format!("{}/v1/members", self.config.api_base_url)
    }

    fn member_url(&self, member_id: &str) -> Result<String, DirectoryError> {
        // Memberstack ids are [A-Za-z0-9_]; anything else would alter the path.
        if member_id.is_empty()
            || !member_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DirectoryError::InvalidMemberId(member_id.to_string()));
        }

        Ok(format!("{}/{}", self.members_url(), member_id))
    }

    async fn error_for_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DirectoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(DirectoryError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DirectoryError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MemberDirectory for MemberstackDirectory {
    fn credit_field(&self) -> &str {
        self.config.credit_field()
    }

    async fn find_members_by_email(&self, email: &str) -> Result<Vec<Member>, DirectoryError> {
        let response = self
            .http_client
            .get(self.members_url())
            .bearer_auth(self.config.secret.expose_secret())
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        let response = Self::error_for_status(response).await?;

        let members: MembersResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;

        Ok(members.into_members())
    }

    async fn patch_member_credits(
        &self,
        member_id: &str,
        new_balance: i64,
    ) -> Result<(), DirectoryError> {
        let url = self.member_url(member_id)?;

        let mut custom_fields = serde_json::Map::new();
        custom_fields.insert(self.config.credit_field.clone(), json!(new_balance));

        let response = self
            .http_client
            .patch(url)
            .bearer_auth(self.config.secret.expose_secret())
            .json(&json!({ "customFields": custom_fields }))
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        Self::error_for_status(response).await?;

        tracing::debug!(
            member_id,
            field = %self.config.credit_field,
            new_balance,
            "Member credit field patched"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MemberstackConfig::new("sk_ms");
        assert_eq!(config.api_base_url, "https://api.memberstack.com");
        assert_eq!(config.credit_field(), "extra-credits");
    }

    #[test]
    fn config_builders() {
        let config = MemberstackConfig::new("sk_ms")
            .with_base_url("http://127.0.0.1:9000/")
            .with_credit_field("credits");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.credit_field(), "credits");
    }

    #[test]
    fn member_url_uses_base() {
        let directory = MemberstackDirectory::new(
            MemberstackConfig::new("sk_ms").with_base_url("http://members.local"),
        );
        assert_eq!(
            directory.member_url("mem_sb_a1B2").unwrap(),
            "http://members.local/v1/members/mem_sb_a1B2"
        );
    }

    #[test]
    fn member_url_rejects_path_characters() {
        let directory = MemberstackDirectory::new(MemberstackConfig::new("sk_ms"));
        for id in ["", "mem_1/../admin", "mem_1?x=1", "mem 1"] {
            assert!(
                matches!(directory.member_url(id), Err(DirectoryError::InvalidMemberId(_))),
                "{id:?}"
            );
        }
    }

    #[tokio::test]
    async fn patch_with_malformed_id_fails_before_sending() {
        let directory = MemberstackDirectory::new(
            MemberstackConfig::new("sk_ms").with_base_url("http://127.0.0.1:9"),
        );

        let result = directory.patch_member_credits("mem_1/../admin", 5).await;

        assert!(matches!(result, Err(DirectoryError::InvalidMemberId(_))));
    }

    #[test]
    fn directory_exposes_configured_credit_field() {
        let directory =
            MemberstackDirectory::new(MemberstackConfig::new("sk_ms").with_credit_field("credits"));
        assert_eq!(MemberDirectory::credit_field(&directory), "credits");
    }

    #[test]
    fn members_response_accepts_bare_array() {
        let raw = r#"[{"id":"mem_1","customFields":{"extra-credits":2}}]"#;
        let members = serde_json::from_str::<MembersResponse>(raw)
            .unwrap()
            .into_members();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, "mem_1");
    }

    #[test]
    fn members_response_accepts_data_envelope() {
        let raw = r#"{"data":[{"id":"mem_1"},{"id":"mem_2"}],"totalCount":2}"#;
        let members = serde_json::from_str::<MembersResponse>(raw)
            .unwrap()
            .into_members();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].id, "mem_2");
    }

    #[test]
    fn members_response_rejects_unrelated_shape() {
        assert!(serde_json::from_str::<MembersResponse>(r#"{"error":"nope"}"#).is_err());
    }
}
