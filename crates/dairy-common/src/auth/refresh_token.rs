//! Opaque refresh token secrets
//!
//! Refresh tokens are random strings handed to the client in a cookie. The
//! server only ever persists their SHA-256 digest.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Bytes of OS randomness per token (256 bits)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token: 32 random bytes, hex encoded (64 chars)
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest stored in place of the raw token
#[must_use]
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
