//! Token Factory
//!
//! Builds signed HS256 access tokens with assembled claims, and generates
//! cryptographically random refresh tokens. Pure construction — persisting
//! the refresh token is the orchestrator's responsibility.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, TokenData, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenOptions;
use crate::domain::{ClientToken, ServiceClient, TokenPair, UserAccount};
use crate::error::Result;
use crate::service::signing::SigningKey;

/// Refresh tokens carry 256 bits of entropy.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Claims embedded in every access token.
///
/// User tokens carry email, username, roles, and the custom attribute
/// claims; client tokens carry only sub, jti, and the client's audiences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: user id or client id
    pub sub: String,

    pub iss: String,

    pub aud: Vec<String>,

    /// Unique token id, fresh per issuance
    pub jti: String,

    /// Expiry (seconds since epoch)
    pub exp: i64,

    /// Not-before (seconds since epoch)
    pub nbf: i64,

    /// Issued-at (seconds since epoch)
    pub iat: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// One entry per role the user holds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// Mints access tokens and refresh-token values.
pub struct TokenService {
    options: TokenOptions,
    key: SigningKey,
    accepted_audiences: Vec<String>,
}

impl TokenService {
    /// Validates options and derives the signing key. Configuration
    /// failures surface here, at startup, not per request.
    pub fn new(options: TokenOptions) -> Result<Self> {
        options.validate()?;
        let key = SigningKey::from_secret(&options.security_key)?;
        let accepted_audiences = options.audiences.clone();
        Ok(Self {
            options,
            key,
            accepted_audiences,
        })
    }

    /// Extend the audiences `decode` accepts beyond the user-token set,
    /// e.g. with the client registry's audiences so client tokens verify.
    pub fn with_accepted_audiences(
        mut self,
        audiences: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        for audience in audiences {
            let audience = audience.into();
            if !self.accepted_audiences.contains(&audience) {
                self.accepted_audiences.push(audience);
            }
        }
        self
    }

    /// Build a signed access token plus a fresh refresh token for a user.
    pub fn create_user_token(&self, user: &UserAccount) -> Result<TokenPair> {
        let now = Utc::now();
        let access_expiration =
            now + Duration::minutes(self.options.access_token_expiration_minutes);
        let refresh_expiration =
            now + Duration::minutes(self.options.refresh_token_expiration_minutes);

        let claims = AccessTokenClaims {
            sub: user.id.clone(),
            iss: self.options.issuer.clone(),
            aud: self.options.audiences.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: access_expiration.timestamp(),
            nbf: self.not_before(now),
            iat: now.timestamp(),
            email: Some(user.email.clone()),
            preferred_username: Some(user.user_name.clone()),
            roles: user.roles.clone(),
            city: user.city.clone(),
            birth_date: user.birth_date.map(|d| d.to_string()),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, self.key.encoding())?;

        Ok(TokenPair {
            access_token,
            access_token_expiration: access_expiration,
            refresh_token: Self::create_refresh_token(),
            refresh_token_expiration: refresh_expiration,
        })
    }

    /// Build a signed access token for a machine client. No refresh token.
    pub fn create_client_token(&self, client: &ServiceClient) -> Result<ClientToken> {
        let now = Utc::now();
        let access_expiration =
            now + Duration::minutes(self.options.access_token_expiration_minutes);

        let claims = AccessTokenClaims {
            sub: client.id.clone(),
            iss: self.options.issuer.clone(),
            aud: client.audiences.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: access_expiration.timestamp(),
            nbf: self.not_before(now),
            iat: now.timestamp(),
            email: None,
            preferred_username: None,
            roles: Vec::new(),
            city: None,
            birth_date: None,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, self.key.encoding())?;

        Ok(ClientToken {
            access_token,
            access_token_expiration: access_expiration,
        })
    }

    /// Verify signature, issuer, audience, expiry, and not-before. The
    /// accepted audience set is the configured user audiences plus any
    /// added via `with_accepted_audiences`.
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.options.issuer]);
        validation.set_audience(&self.accepted_audiences);
        validation.validate_nbf = true;

        let data: TokenData<AccessTokenClaims> =
            decode(token, self.key.decoding(), &validation)?;
        Ok(data.claims)
    }

    /// 32 cryptographically secure random bytes, base64-encoded.
    fn create_refresh_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        BASE64.encode(bytes)
    }

    fn not_before(&self, now: DateTime<Utc>) -> i64 {
        (now - Duration::seconds(self.options.clock_skew_seconds)).timestamp()
    }
}
