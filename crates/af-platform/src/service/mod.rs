//! Service Layer
//!
//! Business logic for the platform: token issuance, credential
//! verification, and the authentication flows.

pub mod auth;
pub mod password;
pub mod signing;
pub mod token;

pub use auth::AuthenticationService;
pub use password::PasswordService;
pub use signing::SigningKey;
pub use token::{AccessTokenClaims, TokenService};
