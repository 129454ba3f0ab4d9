//! Session persistence

mod refresh_token;

pub use refresh_token::{IssuedRefreshToken, RefreshTokenStore, DEFAULT_REFRESH_TOKEN_TTL_DAYS};
