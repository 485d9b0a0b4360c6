//! Refresh Token Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted refresh token, at most one live record per user.
///
/// The record is keyed by user id (`_id` in MongoDB), so issuing a new
/// token for a user overwrites the prior record instead of accumulating.
/// Lookups for rotation and revocation match on `code`, exact and
/// case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    #[serde(rename = "_id")]
    pub user_id: String,

    /// Opaque 256-bit random value, standard base64
    pub code: String,

    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(
        user_id: impl Into<String>,
        code: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            code: code.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
