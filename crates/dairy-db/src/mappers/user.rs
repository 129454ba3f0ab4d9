//! User entity <-> model mapper

use dairy_core::entities::User;
use dairy_core::value_objects::Snowflake;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            name: model.name,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Borrowed column values for inserting a user row
pub struct UserInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User, password_hash: &'a str) -> Self {
        Self {
            id: user.id.into_inner(),
            name: &user.name,
            email: &user.email,
            password_hash,
        }
    }
}
