//! Authentication handlers
//!
//! Endpoints for registration, login, token refresh, logout, and the
//! current user. Refresh tokens move only through the cookie.

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use dairy_service::{AuthService, LoginRequest, MeResponse, RegisterRequest};

use crate::cookies::{clear_refresh_cookie, refresh_cookie, refresh_token_from};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = AuthService::new(state.service_context())
        .register(request)
        .await?;

    let jar = jar.add(refresh_cookie(&session.refresh_token, state.cookie_secure()));
    Ok((jar, Json(session.response)))
}

/// Login with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = AuthService::new(state.service_context())
        .login(request)
        .await?;

    let jar = jar.add(refresh_cookie(&session.refresh_token, state.cookie_secure()));
    Ok((jar, Json(session.response)))
}

/// Rotate the refresh token and mint a new access token
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let session = AuthService::new(state.service_context())
        .refresh(refresh_token_from(&jar))
        .await?;

    let jar = jar.add(refresh_cookie(&session.refresh_token, state.cookie_secure()));
    Ok((jar, Json(session.response)))
}

/// Revoke the refresh token and clear the cookie
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    AuthService::new(state.service_context())
        .logout(refresh_token_from(&jar))
        .await?;

    let jar = jar.add(clear_refresh_cookie(state.cookie_secure()));
    Ok((jar, NoContent))
}

/// Current user
///
/// GET /auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let me = AuthService::new(state.service_context())
        .me(auth.user_id)
        .await?;
    Ok(Json(me))
}
