//! Service context - dependency container for services
//!
//! Holds the repositories, the refresh token store, and the signing and id
//! services. Nothing in here is global; tests build their own.

use std::sync::Arc;

use dairy_common::auth::JwtService;
use dairy_core::traits::{RefreshTokenRepository, UserRepository};
use dairy_core::{Snowflake, SnowflakeGenerator};
use dairy_db::{PgPool, PgRefreshTokenRepository, PgUserRepository};

use crate::session::{RefreshTokenStore, DEFAULT_REFRESH_TOKEN_TTL_DAYS};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Absent when the repositories are in-memory doubles
    pool: Option<PgPool>,

    user_repo: Arc<dyn UserRepository>,
    refresh_token_store: RefreshTokenStore,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        pool: Option<PgPool>,
        user_repo: Arc<dyn UserRepository>,
        refresh_token_store: RefreshTokenStore,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            pool,
            user_repo,
            refresh_token_store,
            jwt_service,
            snowflake_generator,
        }
    }

    /// Wire the PostgreSQL repositories over a pool
    pub fn with_postgres(
        pool: PgPool,
        refresh_token_ttl_days: i64,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
        let refresh_repo = Arc::new(PgRefreshTokenRepository::new(pool.clone()));

        Self::new(
            Some(pool),
            user_repo,
            RefreshTokenStore::with_ttl_days(refresh_repo, refresh_token_ttl_days),
            jwt_service,
            snowflake_generator,
        )
    }

    // === Database Pool ===

    /// Get the PostgreSQL connection pool, if this context has one
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    // === Stores ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the refresh token store
    pub fn refresh_token_store(&self) -> &RefreshTokenStore {
        &self.refresh_token_store
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("refresh_token_store", &self.refresh_token_store)
            .field("jwt_service", &self.jwt_service)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    refresh_token_ttl_days: i64,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            pool: None,
            user_repo: None,
            refresh_token_repo: None,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            jwt_service: None,
            snowflake_generator: None,
        }
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn refresh_token_ttl_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl_days = days;
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let refresh_token_repo = self
            .refresh_token_repo
            .ok_or_else(|| ServiceError::validation("refresh_token_repo is required"))?;

        Ok(ServiceContext::new(
            self.pool,
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            RefreshTokenStore::with_ttl_days(refresh_token_repo, self.refresh_token_ttl_days),
            self.jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
