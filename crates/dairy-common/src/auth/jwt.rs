//! Access token issuance and verification
//!
//! Access tokens are short-lived HS256 JWTs carrying the user id. They are
//! stateless: nothing about an issued access token is stored, so revocation
//! happens only at the refresh-token layer.

use chrono::{Duration, Utc};
use dairy_core::Snowflake;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (the subject)
    pub id: Snowflake,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token ID, so two tokens minted in the same second differ
    pub jti: String,
}

impl Claims {
    /// Get the user ID
    #[must_use]
    pub fn user_id(&self) -> Snowflake {
        self.id
    }
}

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// JWT service for signing and verifying access tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and lifetime in seconds
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Sign a new access token for a user
    ///
    /// # Errors
    /// Returns an error if the expiry does not fit in a timestamp or token
    /// encoding fails
    pub fn issue(&self, user_id: Snowflake) -> Result<AccessToken, AppError> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.access_token_expiry)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("access token expiry overflows")))?;
        let claims = Claims {
            id: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.sign(&claims)?;
        Ok(AccessToken {
            token,
            expires_in: self.access_token_expiry,
        })
    }

    /// Verify a token's signature and expiry and return its claims
    ///
    /// # Errors
    /// Returns `AppError::TokenExpired` for an expired token and
    /// `AppError::InvalidToken` for anything else that fails to verify
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .finish_non_exhaustive()
    }
}
