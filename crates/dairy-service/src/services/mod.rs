//! Business logic services
//!
//! Service layer implementations that handle validation and orchestration
//! of domain operations.

pub mod auth;
pub mod context;
pub mod error;

// Re-export all services for convenience
pub use auth::{AuthService, AuthSession, RefreshedSession};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
