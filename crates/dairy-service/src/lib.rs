//! # dairy-service
//!
//! Application layer: the session coordinator that ties the credential
//! store, password verifier, access token issuer and refresh token store
//! together, plus the DTOs it speaks.

pub mod dto;
pub mod services;
pub mod session;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use services::{
    AuthService, AuthSession, RefreshedSession, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
pub use session::{IssuedRefreshToken, RefreshTokenStore};
pub use dto::{
    AccessTokenResponse, AuthResponse, HealthResponse, LoginRequest, MeResponse,
    ReadinessResponse, RegisterRequest, UserResponse,
};
