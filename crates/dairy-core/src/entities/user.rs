//! User entity - an account that can sign in to the dairy suite

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// User account identity.
///
/// The password hash is deliberately not part of the entity; it is only
/// reachable through [`crate::traits::UserRepository::get_password_hash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with required fields
    ///
    /// The email is normalized with [`normalize_email`].
    pub fn new(id: Snowflake, name: String, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email: normalize_email(email),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form of an email address for storage and lookup.
///
/// Emails are compared case-insensitively across the suite, so every
/// address is trimmed and lowercased before it reaches the store.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
