//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    RateLimitConfig, RefreshTokenConfig, ServerConfig, SnowflakeConfig, MAX_ACCESS_TOKEN_EXPIRY_SECS,
    MAX_REFRESH_TOKEN_TTL_DAYS, MIN_JWT_SECRET_LEN,
};
