//! Authentication service
//!
//! The session coordinator: registration, login, refresh token rotation,
//! logout, and the current-user lookup.
//!
//! ```text
//! Anonymous --register/login--> Authenticated --refresh--> Authenticated (rotated)
//!                                     |                          |
//!                                     +---------logout-----------+--> Revoked
//! ```

use dairy_common::auth::{
    hash_password, validate_password_strength, verify_dummy_password, verify_password,
};
use dairy_common::AppError;
use dairy_core::entities::{normalize_email, User};
use dairy_core::{DomainError, Snowflake};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dto::{
    AccessTokenResponse, AuthResponse, LoginRequest, MeResponse, RegisterRequest, UserResponse,
};
use crate::session::IssuedRefreshToken;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of register and login: the response body plus the refresh token
/// the transport layer must hand to the client out of band.
#[derive(Debug)]
pub struct AuthSession {
    pub response: AuthResponse,
    pub refresh_token: IssuedRefreshToken,
}

/// Outcome of a successful refresh
#[derive(Debug)]
pub struct RefreshedSession {
    pub response: AccessTokenResponse,
    pub refresh_token: IssuedRefreshToken,
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new user and sign them in
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthSession> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        validate_password_strength(&request.password)?;
        if request.name.trim().is_empty() {
            return Err(ServiceError::validation("Name must not be blank"));
        }

        let password_hash = hash_password(&request.password)?;

        let user = User::new(
            self.ctx.generate_id(),
            request.name.trim().to_string(),
            &request.email,
        );

        // The unique index decides duplicates; no read-then-write race.
        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered successfully");

        self.start_session(&user).await
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password are indistinguishable to the caller,
    /// in both the error and the time taken.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession> {
        let email = normalize_email(&request.email);

        let Some(user) = self.ctx.user_repo().find_by_email(&email).await? else {
            verify_dummy_password(&request.password);
            warn!("Login failed: unknown email");
            return Err(AppError::InvalidCredentials.into());
        };

        let Some(password_hash) = self.ctx.user_repo().get_password_hash(user.id).await? else {
            verify_dummy_password(&request.password);
            warn!(user_id = %user.id, "Login failed: no password hash");
            return Err(AppError::InvalidCredentials.into());
        };

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(AppError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User logged in successfully");

        self.start_session(&user).await
    }

    /// Exchange a refresh token for a new access token and a new refresh token.
    ///
    /// The presented token is consumed whether or not the rest succeeds.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: Option<String>) -> ServiceResult<RefreshedSession> {
        let token = refresh_token.ok_or(AppError::Unauthenticated)?;

        let user_id = match self.ctx.refresh_token_store().consume(&token).await {
            Ok(user_id) => user_id,
            Err(DomainError::RefreshTokenNotFound) => {
                warn!(
                    target: "security",
                    "Unknown refresh token presented; possible replay of a rotated token"
                );
                return Err(AppError::SessionExpiredOrInvalid.into());
            }
            Err(DomainError::RefreshTokenExpired) => {
                info!("Expired refresh token presented");
                return Err(AppError::SessionExpiredOrInvalid.into());
            }
            Err(e) => {
                error!(error = %e, "Refresh token store failed during consume");
                return Err(AppError::SessionExpiredOrInvalid.into());
            }
        };

        let refresh_token = self.ctx.refresh_token_store().issue(user_id).await?;
        let access = self.ctx.jwt_service().issue(user_id)?;

        info!(user_id = %user_id, "Tokens refreshed successfully");

        Ok(RefreshedSession {
            response: AccessTokenResponse::new(access.token, access.expires_in),
            refresh_token,
        })
    }

    /// Logout by revoking the presented refresh token.
    ///
    /// Always succeeds: a missing, unknown, or already revoked token is
    /// treated as already logged out.
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: Option<String>) -> ServiceResult<()> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        match self.ctx.refresh_token_store().revoke(&token).await {
            Ok(true) => info!("User logged out successfully"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Failed to revoke refresh token on logout"),
        }

        Ok(())
    }

    /// Look up the account behind a verified access token
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Snowflake) -> ServiceResult<MeResponse> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .map(MeResponse::from)
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    /// Issue a refresh token and an access token for a freshly authenticated user
    async fn start_session(&self, user: &User) -> ServiceResult<AuthSession> {
        let refresh_token = self.ctx.refresh_token_store().issue(user.id).await?;
        let access = self.ctx.jwt_service().issue(user.id)?;

        Ok(AuthSession {
            response: AuthResponse::new(access.token, access.expires_in, UserResponse::from(user)),
            refresh_token,
        })
    }
}
