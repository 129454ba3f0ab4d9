//! In-memory repository doubles
//!
//! Used by the unit tests in this crate and, through the `test-util`
//! feature, by the HTTP tests that run without PostgreSQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dairy_common::JwtService;
use dairy_core::{
    DomainError, RefreshToken, RefreshTokenRepository, RepoResult, Snowflake, SnowflakeGenerator,
    User, UserRepository,
};

use crate::services::{ServiceContext, ServiceContextBuilder};

/// Signing secret used by [`in_memory_context`]
pub const TEST_JWT_SECRET: &str = "test-secret-key-that-is-long-enough-for-hs256";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Users keyed by id, with their password hashes
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Snowflake, (User, String)>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.users).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop a user, as if deleted out of band
    pub fn remove(&self, id: Snowflake) {
        lock(&self.users).remove(&id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(lock(&self.users).get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(lock(&self.users)
            .values()
            .find(|(user, _)| user.email.to_lowercase() == email)
            .map(|(user, _)| user.clone()))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut users = lock(&self.users);
        let email = user.email.to_lowercase();
        if users.contains_key(&user.id)
            || users
                .values()
                .any(|(existing, _)| existing.email.to_lowercase() == email)
        {
            return Err(DomainError::EmailAlreadyExists);
        }
        users.insert(user.id, (user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(lock(&self.users).get(&id).map(|(_, hash)| hash.clone()))
    }
}

/// Refresh token rows keyed by digest.
///
/// `take` removes under one lock acquisition, mirroring the single-statement
/// delete of the PostgreSQL store. `set_failing(true)` turns every call into
/// a `DatabaseError`.
#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    rows: Mutex<HashMap<String, RefreshToken>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_hash(&self, token_hash: &str) -> bool {
        lock(&self.rows).contains_key(token_hash)
    }

    /// Simulate a storage outage
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert(
        &self,
        user_id: Snowflake,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshToken> {
        self.check()?;
        let row = RefreshToken {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        let mut rows = lock(&self.rows);
        if rows.contains_key(token_hash) {
            return Err(DomainError::DatabaseError(
                "duplicate token hash".to_string(),
            ));
        }
        rows.insert(row.token_hash.clone(), row.clone());
        Ok(row)
    }

    async fn take(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        self.check()?;
        Ok(lock(&self.rows).remove(token_hash))
    }

    async fn delete(&self, token_hash: &str) -> RepoResult<bool> {
        self.check()?;
        Ok(lock(&self.rows).remove(token_hash).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        self.check()?;
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|_, row| !row.is_expired_at(now));
        Ok((before - rows.len()) as u64)
    }
}

/// A context wired to fresh in-memory repositories
pub struct InMemoryContext {
    pub ctx: ServiceContext,
    pub users: Arc<InMemoryUserRepository>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
}

/// Build a [`ServiceContext`] with no database behind it
pub fn in_memory_context() -> InMemoryContext {
    let users = Arc::new(InMemoryUserRepository::new());
    let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());

    let ctx = ServiceContextBuilder::new()
        .user_repo(users.clone())
        .refresh_token_repo(refresh_tokens.clone())
        .jwt_service(Arc::new(JwtService::new(TEST_JWT_SECRET, 900)))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
        .build()
        .unwrap_or_else(|e| panic!("in-memory context is fully wired: {e}"));

    InMemoryContext {
        ctx,
        users,
        refresh_tokens,
    }
}
