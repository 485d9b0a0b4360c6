//! Domain Entities
//!
//! Core entities for the authentication platform.

pub mod client;
pub mod refresh_token;
pub mod token;
pub mod user;

pub use client::ServiceClient;
pub use refresh_token::RefreshTokenRecord;
pub use token::{ClientToken, TokenPair};
pub use user::{NewUser, UserAccount};
