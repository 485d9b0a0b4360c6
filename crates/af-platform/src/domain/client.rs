//! Machine Client Entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A known machine caller, loaded from configuration at startup.
/// Immutable after load; client-credential exchange issues access tokens
/// carrying these audiences, never a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceClient {
    pub id: String,

    pub secret: String,

    /// Relying parties this client's tokens are intended for
    pub audiences: Vec<String>,
}

impl ServiceClient {
    pub fn new(
        id: impl Into<String>,
        secret: impl Into<String>,
        audiences: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            audiences: audiences.into_iter().map(Into::into).collect(),
        }
    }

    /// Both id and secret must match; the check is exact and case-sensitive.
    pub fn matches(&self, id: &str, secret: &str) -> bool {
        self.id == id && self.secret == secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_requires_both_fields() {
        let client = ServiceClient::new("app1", "secret1", ["www.api1.com"]);
        assert!(client.matches("app1", "secret1"));
        assert!(!client.matches("app1", "wrong"));
        assert!(!client.matches("app2", "secret1"));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let client = ServiceClient::new("app1", "Secret1", ["www.api1.com"]);
        assert!(!client.matches("App1", "Secret1"));
        assert!(!client.matches("app1", "secret1"));
    }
}
