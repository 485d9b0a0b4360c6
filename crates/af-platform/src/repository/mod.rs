//! Repository Layer
//!
//! Persistence ports consumed by the services, with MongoDB
//! implementations for production and in-memory implementations for
//! tests and local development.

pub mod memory;
pub mod refresh_token;
pub mod user;

pub use memory::{InMemoryRefreshTokenStore, InMemoryUserDirectory};
pub use refresh_token::{MongoRefreshTokenStore, RefreshTokenStore};
pub use user::{MongoUserDirectory, UserDirectory};
