//! Refresh token entity <-> model mapper

use dairy_core::entities::RefreshToken;
use dairy_core::value_objects::Snowflake;

use crate::models::RefreshTokenModel;

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: model.id,
            user_id: Snowflake::new(model.user_id),
            token_hash: model.token_hash,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}
