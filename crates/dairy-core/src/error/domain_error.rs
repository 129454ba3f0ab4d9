//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    /// The id or the email collided; the message never says which.
    #[error("Email already exists")]
    EmailAlreadyExists,

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RefreshTokenNotFound => "UNKNOWN_REFRESH_TOKEN",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Session
            Self::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::RefreshTokenNotFound)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EmailAlreadyExists)
    }

    /// Check if this error means the presented refresh token is unusable
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::RefreshTokenNotFound | Self::RefreshTokenExpired)
    }
}
