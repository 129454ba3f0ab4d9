//! # dairy-common
//!
//! Shared utilities including configuration, error handling, credential
//! primitives (password hashing, access tokens, refresh token secrets), and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_refresh_token, hash_password, hash_refresh_token, validate_password_strength,
    verify_dummy_password, verify_password, AccessToken, Claims, JwtService,
    REFRESH_TOKEN_BYTES,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    RateLimitConfig, RefreshTokenConfig, ServerConfig, SnowflakeConfig, MIN_JWT_SECRET_LEN,
};
pub use error::{AppError, INTERNAL_ERROR_MESSAGE};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
