//! OpenAPI Document

use utoipa::OpenApi;

use crate::api::auth::{ClientLoginRequest, LoginRequest, RefreshTokenRequest};
use crate::api::common::{ApiEnvelope, ErrorBody, NoData};
use crate::api::users::{AssignRolesRequest, CreateUserRequest, UserResponse};
use crate::domain::{ClientToken, TokenPair};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AuthForge API",
        description = "Token issuance, refresh-token lifecycle, and user directory"
    ),
    paths(
        crate::api::auth::create_token,
        crate::api::auth::create_token_by_client,
        crate::api::auth::create_token_by_refresh_token,
        crate::api::auth::revoke_refresh_token,
        crate::api::users::create_user,
        crate::api::users::get_user_by_name,
        crate::api::users::assign_roles,
    ),
    components(schemas(
        LoginRequest,
        ClientLoginRequest,
        RefreshTokenRequest,
        CreateUserRequest,
        AssignRolesRequest,
        UserResponse,
        TokenPair,
        ClientToken,
        ErrorBody,
        NoData,
        ApiEnvelope<TokenPair>,
        ApiEnvelope<ClientToken>,
        ApiEnvelope<UserResponse>,
        ApiEnvelope<NoData>,
    )),
    tags(
        (name = "auth", description = "Authentication and token lifecycle"),
        (name = "users", description = "User directory management")
    )
)]
pub struct ApiDoc;
