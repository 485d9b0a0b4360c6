//! Platform Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    // Identical message for unknown email and wrong password so callers
    // cannot enumerate registered accounts.
    #[error("Email or password is wrong")]
    InvalidCredentials,

    #[error("ClientId or ClientSecret not found")]
    ClientNotFound,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Duplicate user: {field}={value}")]
    DuplicateUser { field: String, value: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hash error: {message}")]
    PasswordHash { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn duplicate_user(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::DuplicateUser {
            field: field.into(),
            value: value.into(),
        }
    }

    /// HTTP status the error maps to in the response envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::InvalidCredentials | Self::DuplicateUser { .. } => 400,
            Self::RefreshTokenExpired => 401,
            Self::ClientNotFound | Self::RefreshTokenNotFound | Self::UserNotFound => 404,
            _ => 500,
        }
    }

    /// Whether the error message is safe to show to the caller.
    /// Internal failures (database, signing, configuration) are suppressed
    /// and rendered as a generic message.
    pub fn user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidCredentials
                | Self::ClientNotFound
                | Self::RefreshTokenNotFound
                | Self::RefreshTokenExpired
                | Self::UserNotFound
                | Self::DuplicateUser { .. }
        )
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_is_enumeration_safe() {
        // Single variant, single message, regardless of which check failed.
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.to_string(), "Email or password is wrong");
        assert_eq!(err.status_code(), 400);
        assert!(err.user_facing());
    }

    #[test]
    fn test_not_found_statuses() {
        assert_eq!(AuthError::ClientNotFound.status_code(), 404);
        assert_eq!(AuthError::RefreshTokenNotFound.status_code(), 404);
        assert_eq!(AuthError::UserNotFound.status_code(), 404);
    }

    #[test]
    fn test_internal_errors_are_suppressed() {
        let err = AuthError::configuration("signing key too short");
        assert_eq!(err.status_code(), 500);
        assert!(!err.user_facing());

        let err = AuthError::internal("unexpected");
        assert!(!err.user_facing());
    }

    #[test]
    fn test_expired_refresh_token() {
        let err = AuthError::RefreshTokenExpired;
        assert_eq!(err.status_code(), 401);
        assert!(err.user_facing());
    }
}
