//! Domain entities - identity and session records

mod refresh_token;
mod user;

pub use refresh_token::RefreshToken;
pub use user::{normalize_email, User};
