//! Credential primitives

mod jwt;
mod password;
mod refresh_token;

pub use jwt::{AccessToken, Claims, JwtService};
pub use password::{
    hash_password, validate_password_strength, verify_dummy_password, verify_password,
};
pub use refresh_token::{generate_refresh_token, hash_refresh_token, REFRESH_TOKEN_BYTES};
