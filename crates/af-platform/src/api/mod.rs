//! API Layer
//!
//! REST endpoints for the authentication platform. Every endpoint returns
//! the uniform envelope from `common`.

pub mod auth;
pub mod common;
pub mod openapi;
pub mod users;

pub use auth::{auth_router, AuthApiState};
pub use common::{ApiEnvelope, ErrorBody, NoData};
pub use openapi::ApiDoc;
pub use users::{users_router, UsersApiState};
