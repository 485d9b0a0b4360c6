//! Common API types
//!
//! The uniform response envelope every endpoint returns: payload, status
//! code, and an error block that distinguishes user-facing messages from
//! suppressed internal ones.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::error::AuthError;

/// Error block carried in failed envelopes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub messages: Vec<String>,

    /// Whether the messages are safe to display to the caller
    pub user_facing: bool,
}

/// Empty payload for operations that return no data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoData {}

/// Uniform response envelope: `{ data | null, statusCode, errors | null }`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T: ToSchema> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorBody>,
}

impl<T: ToSchema> ApiEnvelope<T> {
    pub fn success(data: T, status_code: u16) -> Self {
        Self {
            data: Some(data),
            status_code,
            errors: None,
        }
    }

    pub fn fail(messages: Vec<String>, status_code: u16, user_facing: bool) -> Self {
        Self {
            data: None,
            status_code,
            errors: Some(ErrorBody {
                messages,
                user_facing,
            }),
        }
    }

    /// Convert an error into a failed envelope. Non-user-facing errors are
    /// logged and rendered with a generic message.
    pub fn from_error(err: &AuthError) -> Self {
        if err.user_facing() {
            Self::fail(vec![err.to_string()], err.status_code(), true)
        } else {
            error!(error = %err, "Internal error converted to response");
            Self::fail(
                vec!["An internal server error occurred".to_string()],
                err.status_code(),
                false,
            )
        }
    }
}

impl ApiEnvelope<NoData> {
    pub fn no_content(status_code: u16) -> Self {
        Self {
            data: None,
            status_code,
            errors: None,
        }
    }
}

impl<T: Serialize + ToSchema> IntoResponse for ApiEnvelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Shorthand for handlers: map a service result into the envelope.
pub fn envelope_from<T: ToSchema>(
    result: crate::error::Result<T>,
    success_status: u16,
) -> ApiEnvelope<T> {
    match result {
        Ok(data) => ApiEnvelope::success(data, success_status),
        Err(err) => ApiEnvelope::from_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ApiEnvelope::success(NoData {}, 200);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_user_facing_error_keeps_message() {
        let envelope: ApiEnvelope<NoData> = ApiEnvelope::from_error(&AuthError::InvalidCredentials);
        assert_eq!(envelope.status_code, 400);
        let errors = envelope.errors.unwrap();
        assert!(errors.user_facing);
        assert_eq!(errors.messages, vec!["Email or password is wrong"]);
    }

    #[test]
    fn test_internal_error_is_suppressed() {
        let err = AuthError::internal("connection pool exhausted");
        let envelope: ApiEnvelope<NoData> = ApiEnvelope::from_error(&err);
        assert_eq!(envelope.status_code, 500);
        let errors = envelope.errors.unwrap();
        assert!(!errors.user_facing);
        // The real cause never reaches the client.
        assert!(!errors.messages[0].contains("connection pool"));
    }
}
