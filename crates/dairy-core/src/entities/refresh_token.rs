//! Refresh token entity - a persisted, single-use session credential

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Stored refresh token row.
///
/// Only the hash of the opaque token is kept; the raw value lives in the
/// client's cookie and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: Snowflake,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Check if the token is expired at the given instant.
    ///
    /// A token whose expiry equals `now` is already expired.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
