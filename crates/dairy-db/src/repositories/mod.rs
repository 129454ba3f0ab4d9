//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in dairy-core.

mod error;
mod refresh_token;
mod user;

pub use refresh_token::PgRefreshTokenRepository;
pub use user::PgUserRepository;
