//! # dairy-core
//!
//! Domain layer for the credential core: identity entities, value objects,
//! and the repository ports the storage adapters implement.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{normalize_email, RefreshToken, User};
pub use error::DomainError;
pub use traits::{RefreshTokenRepository, RepoResult, UserRepository};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
