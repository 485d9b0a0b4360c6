//! Platform Configuration
//!
//! Token issuance options and the static registry of machine clients.

use serde::{Deserialize, Serialize};

use crate::domain::ServiceClient;
use crate::error::{AuthError, Result};

/// Options governing signed-token construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOptions {
    /// Issuer claim (`iss`)
    pub issuer: String,

    /// Audiences embedded in user tokens
    pub audiences: Vec<String>,

    /// HMAC-SHA256 signing secret, minimum 32 bytes
    pub security_key: String,

    pub access_token_expiration_minutes: i64,

    pub refresh_token_expiration_minutes: i64,

    /// Tolerance subtracted from `nbf` for clock skew between verifiers.
    #[serde(default)]
    pub clock_skew_seconds: i64,
}

impl TokenOptions {
    pub fn validate(&self) -> Result<()> {
        if self.issuer.is_empty() {
            return Err(AuthError::configuration("token issuer must not be empty"));
        }
        if self.access_token_expiration_minutes <= 0 || self.refresh_token_expiration_minutes <= 0 {
            return Err(AuthError::configuration(
                "token lifetimes must be positive",
            ));
        }
        Ok(())
    }
}

/// Read-only registry of known machine clients.
///
/// Loaded once at startup and shared via Arc; never mutated, so concurrent
/// reads need no locking.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Vec<ServiceClient>,
}

impl ClientRegistry {
    pub fn new(clients: Vec<ServiceClient>) -> Self {
        Self { clients }
    }

    /// Parse the registry from a JSON array of client records.
    pub fn from_json(json: &str) -> Result<Self> {
        let clients: Vec<ServiceClient> = serde_json::from_str(json)?;
        Ok(Self::new(clients))
    }

    pub fn from_json_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuthError::configuration(format!("failed to read client registry {path}: {e}"))
        })?;
        Self::from_json(&contents)
    }

    /// Find the client where BOTH id and secret match the same record.
    pub fn find(&self, id: &str, secret: &str) -> Option<&ServiceClient> {
        self.clients.iter().find(|c| c.matches(id, secret))
    }

    /// Distinct audiences across all registered clients.
    pub fn audiences(&self) -> Vec<String> {
        let mut audiences: Vec<String> = self
            .clients
            .iter()
            .flat_map(|c| c.audiences.iter().cloned())
            .collect();
        audiences.sort();
        audiences.dedup();
        audiences
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
