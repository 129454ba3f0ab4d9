//! Repository ports

mod repositories;

pub use repositories::{RefreshTokenRepository, RepoResult, UserRepository};
