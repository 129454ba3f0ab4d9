//! Entity to DTO mappers

use dairy_core::entities::User;

use super::responses::{MeResponse, UserResponse};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            user: UserResponse::from(&user),
        }
    }
}
