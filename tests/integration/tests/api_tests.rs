//! API Integration Tests
//!
//! Most tests run the real router on in-memory stores. The `pg_` tests
//! additionally need a PostgreSQL instance via `DATABASE_URL` and skip
//! themselves otherwise.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{Duration, Utc};
use dairy_common::hash_refresh_token;
use dairy_core::{RefreshTokenRepository, Snowflake};
use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, refresh_set_cookie,
    refresh_token_of, TestServer,
};
use reqwest::StatusCode;

async fn in_memory() -> TestServer {
    TestServer::start_in_memory()
        .await
        .expect("Failed to start server")
}

/// Register a fresh user, returning the body and the refresh token
async fn register(server: &TestServer) -> (RegisterRequest, AuthResponse, String) {
    let request = RegisterRequest::unique();
    let response = server.post("/auth/register", &request).await.unwrap();
    let token = refresh_token_of(&response).expect("register sets a refresh cookie");
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    (request, auth, token)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = in_memory().await;
    let response = server.get("/health").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    let server = in_memory().await;
    let response = server.get("/health/ready").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_end_to_end_session() {
    let server = in_memory().await;
    let request = RegisterRequest {
        name: "A".to_string(),
        email: "a@x.com".to_string(),
        password: "pw123456".to_string(),
    };

    let response = server.post("/auth/register", &request).await.unwrap();
    let registered: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(registered.user.email, "a@x.com");
    assert_eq!(registered.token_type, "Bearer");

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let login_cookie = refresh_token_of(&response).unwrap();
    let logged_in: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(logged_in.access_token, registered.access_token);
    assert_eq!(logged_in.user.id, registered.user.id);

    let response = server
        .post_with_cookie("/auth/refresh", Some(&login_cookie))
        .await
        .unwrap();
    let rotated_cookie = refresh_token_of(&response).unwrap();
    let refreshed: AccessTokenResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(refreshed.access_token, logged_in.access_token);
    assert_ne!(rotated_cookie, login_cookie);

    let response = server
        .post_with_cookie("/auth/refresh", Some(&login_cookie))
        .await
        .unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error.code, "SESSION_EXPIRED_OR_INVALID");

    // The rotated token is still good
    let response = server
        .post_with_cookie("/auth/refresh", Some(&rotated_cookie))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_register_sets_refresh_cookie() {
    let server = in_memory().await;
    let response = server
        .post("/auth/register", &RegisterRequest::unique())
        .await
        .unwrap();

    let cookie = refresh_set_cookie(&response).unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/auth"));
    assert!(cookie.contains("Max-Age=604800"));
    // Test config serves plain HTTP
    assert!(!cookie.contains("Secure"));

    let token = refresh_token_of(&response).unwrap();
    assert_eq!(token.len(), 64);

    let stores = server.stores.as_ref().unwrap();
    assert!(stores.refresh_tokens.contains_hash(&hash_refresh_token(&token)));
    assert!(!stores.refresh_tokens.contains_hash(&token));
}

#[tokio::test]
async fn test_register_and_login_never_echo_credentials() {
    let server = in_memory().await;
    let request = RegisterRequest::unique();

    let response = server.post("/auth/register", &request).await.unwrap();
    let body = response.text().await.unwrap();
    assert!(!body.contains("password"));
    assert!(!body.contains(&request.password));
    assert!(!body.contains("refreshToken"));

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(!body.contains("password"));
    assert!(!body.contains("$argon2"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = in_memory().await;
    let (request, _, _) = register(&server).await;

    let mut twin = request.clone();
    twin.email = request.email.to_uppercase();
    twin.name = "Someone Else".to_string();

    let response = server.post("/auth/register", &twin).await.unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(err.error.code, "EMAIL_ALREADY_EXISTS");
    assert_eq!(server.stores.as_ref().unwrap().users.len(), 1);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let server = in_memory().await;

    let mut request = RegisterRequest::unique();
    request.email = "not-an-email".to_string();
    let response = server.post("/auth/register", &request).await.unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "VALIDATION_ERROR");

    let mut request = RegisterRequest::unique();
    request.password = "short".to_string();
    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post("/auth/register", &serde_json::json!({ "email": "a@x.com" }))
        .await
        .unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "INVALID_BODY");
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let server = in_memory().await;
    let (request, registered, _) = register(&server).await;

    let login = LoginRequest {
        email: format!("  {}  ", request.email.to_uppercase()),
        password: request.password.clone(),
    };
    let response = server.post("/auth/login", &login).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.user.id, registered.user.id);
}

#[tokio::test]
async fn test_register_trims_padded_email() {
    let server = in_memory().await;
    let mut request = RegisterRequest::unique();
    let canonical = request.email.clone();
    request.email = format!(" {canonical}\t");

    let response = server.post("/auth/register", &request).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.user.email, canonical);

    let login = LoginRequest {
        email: canonical,
        password: request.password.clone(),
    };
    let response = server.post("/auth/login", &login).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_login_invalid_credentials_are_uniform() {
    let server = in_memory().await;
    let (request, _, _) = register(&server).await;

    let wrong_password = LoginRequest {
        email: request.email.clone(),
        password: "not-the-password".to_string(),
    };
    let response = server.post("/auth/login", &wrong_password).await.unwrap();
    assert!(refresh_set_cookie(&response).is_none());
    let a: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let unknown_email = LoginRequest {
        email: "nobody@example.com".to_string(),
        password: "not-the-password".to_string(),
    };
    let response = server.post("/auth/login", &unknown_email).await.unwrap();
    let b: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();

    assert_eq!(a.error.code, "INVALID_CREDENTIALS");
    assert_eq!(a.error.code, b.error.code);
    assert_eq!(a.error.message, b.error.message);
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_without_cookie() {
    let server = in_memory().await;
    let response = server.post_with_cookie("/auth/refresh", None).await.unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error.code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_refresh_with_unknown_token() {
    let server = in_memory().await;
    let response = server
        .post_with_cookie("/auth/refresh", Some("deadbeef"))
        .await
        .unwrap();
    assert!(refresh_set_cookie(&response).is_none());
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_refresh_rejects_and_removes_expired_token() {
    let server = in_memory().await;
    let (_, registered, _) = register(&server).await;
    let stores = server.stores.as_ref().unwrap();

    let user_id: Snowflake = registered.user.id.parse().unwrap();
    let stale = "ab".repeat(32);
    stores
        .refresh_tokens
        .insert(
            user_id,
            &hash_refresh_token(&stale),
            Utc::now() - Duration::minutes(1),
        )
        .await
        .unwrap();

    let response = server
        .post_with_cookie("/auth/refresh", Some(&stale))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
    assert!(!stores.refresh_tokens.contains_hash(&hash_refresh_token(&stale)));
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let server = in_memory().await;
    let (_, _, token) = register(&server).await;

    let (a, b) = tokio::join!(
        server.post_with_cookie("/auth/refresh", Some(&token)),
        server.post_with_cookie("/auth/refresh", Some(&token)),
    );
    let mut statuses = [a.unwrap().status(), b.unwrap().status()];
    statuses.sort();

    assert_eq!(statuses, [StatusCode::OK, StatusCode::FORBIDDEN]);
}

#[tokio::test]
async fn test_refresh_storage_fault_is_session_invalid() {
    let server = in_memory().await;
    let (_, _, token) = register(&server).await;
    let stores = server.stores.as_ref().unwrap();

    stores.refresh_tokens.set_failing(true);
    let response = server
        .post_with_cookie("/auth/refresh", Some(&token))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_storage_fault_does_not_leak_detail() {
    let server = in_memory().await;
    server.stores.as_ref().unwrap().refresh_tokens.set_failing(true);

    let response = server
        .post("/auth/register", &RegisterRequest::unique())
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    let err: ErrorResponse = serde_json::from_str(&body).unwrap();

    assert_eq!(err.error.message, "Internal server error");
    assert!(!body.contains("connection refused"));
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout_is_idempotent() {
    let server = in_memory().await;
    let (_, _, token) = register(&server).await;

    for _ in 0..2 {
        let response = server
            .post_with_cookie("/auth/logout", Some(&token))
            .await
            .unwrap();
        let cookie = refresh_set_cookie(&response).unwrap();
        assert!(cookie.starts_with("refreshToken=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    }

    let response = server
        .post_with_cookie("/auth/refresh", Some(&token))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_logout_without_cookie() {
    let server = in_memory().await;
    let response = server.post_with_cookie("/auth/logout", None).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_logout_leaves_other_sessions() {
    let server = in_memory().await;
    let (request, _, first) = register(&server).await;

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let second = refresh_token_of(&response).unwrap();

    let response = server
        .post_with_cookie("/auth/logout", Some(&first))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post_with_cookie("/auth/refresh", Some(&second))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Me Tests
// ============================================================================

#[tokio::test]
async fn test_me() {
    let server = in_memory().await;
    let (request, registered, _) = register(&server).await;

    let response = server
        .get_auth("/auth/me", &registered.access_token)
        .await
        .unwrap();
    let me: MeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.user.id, registered.user.id);
    assert_eq!(me.user.name, request.name);
    assert_eq!(me.user.email, request.email.to_lowercase());
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let server = in_memory().await;

    let response = server.get("/auth/me").await.unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error.code, "MISSING_AUTHORIZATION");

    let response = server.get_auth("/auth/me", "not.a.jwt").await.unwrap();
    let err: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error.code, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_me_for_vanished_user() {
    let server = in_memory().await;
    let (_, registered, _) = register(&server).await;

    let user_id: Snowflake = registered.user.id.parse().unwrap();
    server.stores.as_ref().unwrap().users.remove(user_id);

    let response = server
        .get_auth("/auth/me", &registered.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// PostgreSQL Tests
// ============================================================================

#[tokio::test]
async fn pg_test_end_to_end_session() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, registered, _) = register(&server).await;

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let login_cookie = refresh_token_of(&response).unwrap();
    let logged_in: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);

    let response = server
        .post_with_cookie("/auth/refresh", Some(&login_cookie))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_with_cookie("/auth/refresh", Some(&login_cookie))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn pg_test_concurrent_refresh_has_one_winner() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (_, _, token) = register(&server).await;

    let (a, b) = tokio::join!(
        server.post_with_cookie("/auth/refresh", Some(&token)),
        server.post_with_cookie("/auth/refresh", Some(&token)),
    );
    let mut statuses = [a.unwrap().status(), b.unwrap().status()];
    statuses.sort();

    assert_eq!(statuses, [StatusCode::OK, StatusCode::FORBIDDEN]);
}
