//! Auth API Endpoints
//!
//! Token issuance and refresh-token lifecycle:
//! - POST /auth/token - Password login, returns access + refresh pair
//! - POST /auth/client-token - Client-credential exchange
//! - POST /auth/refresh - Exchange a refresh token (rotates it)
//! - POST /auth/revoke - Revoke a refresh token

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{envelope_from, ApiEnvelope, NoData};
use crate::domain::{ClientToken, TokenPair};
use crate::service::AuthenticationService;

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,

    pub password: String,
}

/// Client-credential request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientLoginRequest {
    pub client_id: String,

    pub client_secret: String,
}

/// Refresh token exchange / revocation request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub token: String,
}

/// Auth API state
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: Arc<AuthenticationService>,
}

/// Login with email and password
///
/// Issues an access/refresh token pair. Bad email and bad password return
/// the identical error.
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = ApiEnvelope<TokenPair>),
        (status = 400, description = "Invalid credentials", body = ApiEnvelope<TokenPair>)
    )
)]
pub async fn create_token(
    State(state): State<AuthApiState>,
    Json(req): Json<LoginRequest>,
) -> ApiEnvelope<TokenPair> {
    envelope_from(state.auth_service.login(&req.email, &req.password).await, 200)
}

/// Exchange client credentials for an access token
///
/// Machine callers get an access token carrying their configured
/// audiences; no refresh token is issued.
#[utoipa::path(
    post,
    path = "/client-token",
    tag = "auth",
    request_body = ClientLoginRequest,
    responses(
        (status = 200, description = "Client token issued", body = ApiEnvelope<ClientToken>),
        (status = 404, description = "Unknown client", body = ApiEnvelope<ClientToken>)
    )
)]
pub async fn create_token_by_client(
    State(state): State<AuthApiState>,
    Json(req): Json<ClientLoginRequest>,
) -> ApiEnvelope<ClientToken> {
    envelope_from(
        state
            .auth_service
            .client_credentials(&req.client_id, &req.client_secret)
            .await,
        200,
    )
}

/// Exchange a refresh token for a new pair
///
/// The presented refresh token is rotated: it stops working once the new
/// pair is returned.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token pair issued", body = ApiEnvelope<TokenPair>),
        (status = 401, description = "Refresh token expired", body = ApiEnvelope<TokenPair>),
        (status = 404, description = "Refresh token not found", body = ApiEnvelope<TokenPair>)
    )
)]
pub async fn create_token_by_refresh_token(
    State(state): State<AuthApiState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiEnvelope<TokenPair> {
    envelope_from(state.auth_service.refresh(&req.token).await, 200)
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/revoke",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Refresh token revoked", body = ApiEnvelope<NoData>),
        (status = 404, description = "Refresh token not found", body = ApiEnvelope<NoData>)
    )
)]
pub async fn revoke_refresh_token(
    State(state): State<AuthApiState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiEnvelope<NoData> {
    match state.auth_service.revoke(&req.token).await {
        Ok(()) => ApiEnvelope::no_content(200),
        Err(err) => ApiEnvelope::from_error(&err),
    }
}

/// Create the auth router
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/token", post(create_token))
        .route("/client-token", post(create_token_by_client))
        .route("/refresh", post(create_token_by_refresh_token))
        .route("/revoke", post(revoke_refresh_token))
        .with_state(state)
}
