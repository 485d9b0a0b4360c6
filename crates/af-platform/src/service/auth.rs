//! Authentication Orchestrator
//!
//! Coordinates the user directory, token factory, refresh-token store,
//! and client registry across the four authentication flows: login,
//! client-credential exchange, refresh exchange, and revocation.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ClientRegistry;
use crate::domain::{ClientToken, TokenPair, UserAccount};
use crate::error::{AuthError, Result};
use crate::repository::{RefreshTokenStore, UserDirectory};
use crate::service::TokenService;

/// Valid Argon2id hash of no real account's password. Verified against on
/// the unknown-email path so that path costs a password check too, keeping
/// response timing uniform with the wrong-password path.
const DECOY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Request-scoped authentication flows. No mutable state is shared across
/// requests; the refresh-token store's commit is the only durability
/// boundary, so concurrent flows for the same user resolve last-commit-wins.
pub struct AuthenticationService {
    directory: Arc<dyn UserDirectory>,
    tokens: Arc<TokenService>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    clients: Arc<ClientRegistry>,
}

impl AuthenticationService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        tokens: Arc<TokenService>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        clients: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            directory,
            tokens,
            refresh_tokens,
            clients,
        }
    }

    /// Password login. Unknown email and wrong password return the same
    /// error so the endpoint cannot be used to enumerate accounts; the
    /// unknown-email path still performs a password verification so the
    /// two cases cost the same.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::validation("email and password are required"));
        }

        let Some(user) = self.directory.find_by_email(email).await? else {
            let decoy = UserAccount::new("", email, DECOY_PASSWORD_HASH);
            let _ = self.directory.verify_password(&decoy, password).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.directory.verify_password(&user, password).await? {
            warn!(user_id = %user.id, "Login failed: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.create_user_token(&user)?;
        self.rotate_refresh_token(&user.id, &pair).await?;

        info!(user_id = %user.id, "Login succeeded, token pair issued");
        Ok(pair)
    }

    /// Client-credential exchange. Stateless: no refresh token, nothing
    /// persisted.
    pub async fn client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<ClientToken> {
        let client = self
            .clients
            .find(client_id, client_secret)
            .ok_or(AuthError::ClientNotFound)?;

        let token = self.tokens.create_client_token(client)?;
        info!(client_id = %client.id, "Client token issued");
        Ok(token)
    }

    /// Exchange a refresh token for a fresh pair, rotating the stored
    /// value. The presented value becomes unusable once the new pair is
    /// committed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let record = self
            .refresh_tokens
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        if record.is_expired(Utc::now()) {
            warn!(user_id = %record.user_id, "Refresh rejected: token expired");
            return Err(AuthError::RefreshTokenExpired);
        }

        // Dangling record: the owning user was removed after issuance.
        let user = self
            .directory
            .find_by_id(&record.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let pair = self.tokens.create_user_token(&user)?;
        self.refresh_tokens
            .upsert(&user.id, &pair.refresh_token, pair.refresh_token_expiration)
            .await?;
        self.refresh_tokens.commit().await?;

        info!(user_id = %user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Revoke a refresh token. The access tokens it minted stay valid
    /// until they expire; only the refresh chain is cut.
    pub async fn revoke(&self, refresh_token: &str) -> Result<()> {
        let record = self
            .refresh_tokens
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        self.refresh_tokens.delete(&record).await?;
        self.refresh_tokens.commit().await?;

        info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }

    /// One upsert per flow, keyed by user id: first login creates the
    /// record, every later login or refresh overwrites it in place.
    async fn rotate_refresh_token(&self, user_id: &str, pair: &TokenPair) -> Result<()> {
        let existing = self.refresh_tokens.find_by_user_id(user_id).await?;
        match existing {
            Some(_) => info!(user_id = %user_id, "Rotating existing refresh token"),
            None => info!(user_id = %user_id, "Creating refresh token"),
        }

        self.refresh_tokens
            .upsert(user_id, &pair.refresh_token, pair.refresh_token_expiration)
            .await?;
        self.refresh_tokens.commit().await
    }
}
