//! User API Endpoints
//!
//! - POST /users - Create a user
//! - GET /users/:name - Look up a user by name
//! - POST /users/:name/roles - Assign roles

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{envelope_from, ApiEnvelope};
use crate::domain::{NewUser, UserAccount};
use crate::error::AuthError;
use crate::repository::UserDirectory;

/// User creation request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_name: String,

    pub email: String,

    pub password: String,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

/// Role assignment request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolesRequest {
    pub roles: Vec<String>,
}

/// User response; never exposes the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,

    pub user_name: String,

    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    pub roles: Vec<String>,
}

impl From<UserAccount> for UserResponse {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            city: user.city,
            birth_date: user.birth_date,
            roles: user.roles,
        }
    }
}

/// Users API state
#[derive(Clone)]
pub struct UsersApiState {
    pub directory: Arc<dyn UserDirectory>,
}

fn validate_create(req: &CreateUserRequest) -> Result<(), AuthError> {
    if req.user_name.is_empty() {
        return Err(AuthError::validation("userName is required"));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AuthError::validation("a valid email is required"));
    }
    if req.password.len() < 8 {
        return Err(AuthError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Create a user
#[utoipa::path(
    post,
    path = "",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = ApiEnvelope<UserResponse>),
        (status = 400, description = "Validation failure or duplicate", body = ApiEnvelope<UserResponse>)
    )
)]
pub async fn create_user(
    State(state): State<UsersApiState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiEnvelope<UserResponse> {
    if let Err(err) = validate_create(&req) {
        return ApiEnvelope::from_error(&err);
    }

    let result = state
        .directory
        .create_user(NewUser {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
            city: req.city,
            birth_date: req.birth_date,
        })
        .await
        .map(UserResponse::from);
    envelope_from(result, 200)
}

/// Get a user by name
#[utoipa::path(
    get,
    path = "/{name}",
    tag = "users",
    params(("name" = String, Path, description = "User name")),
    responses(
        (status = 200, description = "User found", body = ApiEnvelope<UserResponse>),
        (status = 404, description = "User not found", body = ApiEnvelope<UserResponse>)
    )
)]
pub async fn get_user_by_name(
    State(state): State<UsersApiState>,
    Path(name): Path<String>,
) -> ApiEnvelope<UserResponse> {
    let result = state
        .directory
        .find_by_name(&name)
        .await
        .and_then(|user| user.ok_or(AuthError::UserNotFound))
        .map(UserResponse::from);
    envelope_from(result, 200)
}

/// Assign roles to a user
#[utoipa::path(
    post,
    path = "/{name}/roles",
    tag = "users",
    params(("name" = String, Path, description = "User name")),
    request_body = AssignRolesRequest,
    responses(
        (status = 200, description = "Roles assigned", body = ApiEnvelope<UserResponse>),
        (status = 404, description = "User not found", body = ApiEnvelope<UserResponse>)
    )
)]
pub async fn assign_roles(
    State(state): State<UsersApiState>,
    Path(name): Path<String>,
    Json(req): Json<AssignRolesRequest>,
) -> ApiEnvelope<UserResponse> {
    let result = state
        .directory
        .assign_roles(&name, &req.roles)
        .await
        .map(UserResponse::from);
    envelope_from(result, 200)
}

/// Create the users router
pub fn users_router(state: UsersApiState) -> Router {
    Router::new()
        .route("/", post(create_user))
        .route("/:name", get(get_user_by_name))
        .route("/:name/roles", post(assign_roles))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_name: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            user_name: user_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            city: None,
            birth_date: None,
        }
    }

    #[test]
    fn test_validation_rules() {
        assert!(validate_create(&request("jsmith", "j@example.com", "Password12*")).is_ok());
        assert!(validate_create(&request("", "j@example.com", "Password12*")).is_err());
        assert!(validate_create(&request("jsmith", "not-an-email", "Password12*")).is_err());
        assert!(validate_create(&request("jsmith", "j@example.com", "short")).is_err());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = UserAccount::new("jsmith", "j@example.com", "super-secret-hash");
        let response = UserResponse::from(user);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(json.contains("userName"));
    }
}
