//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Services receive these as `Arc<dyn ...>`
//! so tests can swap in doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{RefreshToken, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository (credential store)
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Create a new user with an already hashed password.
    ///
    /// Fails with `DomainError::EmailAlreadyExists` when the id or the email
    /// is taken.
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new token hash for a user
    async fn insert(
        &self,
        user_id: Snowflake,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshToken>;

    /// Atomically look up and delete the row for `token_hash`.
    ///
    /// Returns the deleted row whether or not it had expired; at most one
    /// concurrent caller can ever receive a given row.
    async fn take(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>>;

    /// Delete the row for `token_hash`, returning whether a row existed
    async fn delete(&self, token_hash: &str) -> RepoResult<bool>;

    /// Delete every row that expired at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}
