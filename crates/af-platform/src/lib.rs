//! AuthForge Platform
//!
//! Core authentication platform providing:
//! - Signed access-token issuance (HS256) with claim assembly
//! - Refresh-token persistence and rotation (one live token per user)
//! - Client-credential exchange for machine callers
//! - User directory with argon2 password verification

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

pub use config::ClientRegistry;
pub use error::AuthError;
