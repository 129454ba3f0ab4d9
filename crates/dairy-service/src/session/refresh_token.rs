//! Refresh token store
//!
//! Wraps a [`RefreshTokenRepository`] with the token lifecycle: mint an opaque
//! secret, persist its digest, consume it exactly once.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use dairy_common::{generate_refresh_token, hash_refresh_token};
use dairy_core::{DomainError, RefreshTokenRepository, RepoResult, Snowflake};
use tracing::{debug, instrument};

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// A refresh token that has just been persisted.
///
/// `token` is the raw secret; it is handed to the client once and never
/// stored or logged.
#[derive(Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: chrono::DateTime<Utc>,
    /// Lifetime in seconds, for the cookie `Max-Age`
    pub max_age_secs: i64,
}

impl fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

/// Refresh token store for managing authentication sessions
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
    ttl_days: i64,
}

impl RefreshTokenStore {
    /// Create a new refresh token store with the default TTL
    #[must_use]
    pub fn new(repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self::with_ttl_days(repo, DEFAULT_REFRESH_TOKEN_TTL_DAYS)
    }

    /// Create with a custom TTL in days
    #[must_use]
    pub fn with_ttl_days(repo: Arc<dyn RefreshTokenRepository>, ttl_days: i64) -> Self {
        Self { repo, ttl_days }
    }

    /// Configured lifetime of a new token, in days
    pub fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    /// Mint and persist a new refresh token for a user
    ///
    /// A lifetime that does not fit in a timestamp is an `InternalError` and
    /// nothing is persisted.
    #[instrument(skip(self))]
    pub async fn issue(&self, user_id: Snowflake) -> RepoResult<IssuedRefreshToken> {
        let ttl = Duration::try_days(self.ttl_days).ok_or_else(|| ttl_overflow(self.ttl_days))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| ttl_overflow(self.ttl_days))?;
        let token = generate_refresh_token();

        self.repo
            .insert(user_id, &hash_refresh_token(&token), expires_at)
            .await?;

        Ok(IssuedRefreshToken {
            token,
            expires_at,
            max_age_secs: ttl.num_seconds(),
        })
    }

    /// Consume a presented token, returning the user it belonged to.
    ///
    /// The row is deleted in the same step it is read, so a token can be
    /// consumed at most once. An expired row is deleted too and reported as
    /// `RefreshTokenExpired`.
    #[instrument(skip_all)]
    pub async fn consume(&self, token: &str) -> RepoResult<Snowflake> {
        let row = self
            .repo
            .take(&hash_refresh_token(token))
            .await?
            .ok_or(DomainError::RefreshTokenNotFound)?;

        if row.is_expired_at(Utc::now()) {
            debug!(user_id = %row.user_id, "Consumed an expired refresh token");
            return Err(DomainError::RefreshTokenExpired);
        }

        Ok(row.user_id)
    }

    /// Delete a token if it exists. Returns whether anything was removed.
    #[instrument(skip_all)]
    pub async fn revoke(&self, token: &str) -> RepoResult<bool> {
        self.repo.delete(&hash_refresh_token(token)).await
    }

    /// Delete every token whose expiry has passed
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> RepoResult<u64> {
        self.repo.delete_expired(Utc::now()).await
    }
}

impl fmt::Debug for RefreshTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenStore")
            .field("ttl_days", &self.ttl_days)
            .finish_non_exhaustive()
    }
}

fn ttl_overflow(ttl_days: i64) -> DomainError {
    DomainError::InternalError(format!("refresh token lifetime of {ttl_days} days overflows"))
}
