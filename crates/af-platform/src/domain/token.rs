//! Issued Token Artifacts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access + refresh token pair returned to user-login and
/// refresh-exchange callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,

    pub access_token_expiration: DateTime<Utc>,

    pub refresh_token: String,

    pub refresh_token_expiration: DateTime<Utc>,
}

/// Access-token-only artifact for machine callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientToken {
    pub access_token: String,

    pub access_token_expiration: DateTime<Utc>,
}
