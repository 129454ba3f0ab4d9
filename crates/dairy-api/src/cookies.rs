//! Refresh token cookie
//!
//! The refresh token only ever travels in this cookie. It is `HttpOnly` so
//! scripts cannot read it, `SameSite=Strict` so other sites cannot send it,
//! and scoped to the `/auth` routes.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dairy_service::IssuedRefreshToken;
use time::Duration;

/// Cookie name
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Cookie path; the browser only sends it to the auth routes
pub const REFRESH_COOKIE_PATH: &str = "/auth";

/// Cookie carrying a freshly issued refresh token
pub fn refresh_cookie(issued: &IssuedRefreshToken, secure: bool) -> Cookie<'static> {
    build(issued.token.clone(), secure)
        .max_age(Duration::seconds(issued.max_age_secs))
        .build()
}

/// Cookie that makes the browser drop the refresh token.
///
/// Added to the jar rather than removed from it, so the clearing header is
/// sent even when the request carried no cookie.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = build(String::new(), secure).build();
    cookie.make_removal();
    cookie
}

/// Read the refresh token from the request cookies; blank counts as absent
pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn build(value: String, secure: bool) -> cookie::CookieBuilder<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path(REFRESH_COOKIE_PATH)
}
