//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests,
//! and reading the refresh cookie back out of responses.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use dairy_api::{create_app, create_app_state, AppState};
use dairy_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, JwtConfig, RateLimitConfig,
    RefreshTokenConfig, ServerConfig, SnowflakeConfig,
};
use dairy_service::testing::{in_memory_context, InMemoryContext, TEST_JWT_SECRET};
use reqwest::{header, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Cookie that carries the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    /// Handles on the in-memory stores, when the server runs without a database
    pub stores: Option<InMemoryContext>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by PostgreSQL (`DATABASE_URL` must be set)
    pub async fn start() -> Result<Self> {
        let config = test_config(database_url()?);
        let state = create_app_state(config).await?;
        Self::serve(state, None).await
    }

    /// Start a server on in-memory stores
    pub async fn start_in_memory() -> Result<Self> {
        let stores = in_memory_context();
        let state = AppState::new(stores.ctx.clone(), test_config(String::new()));
        Self::serve(state, Some(stores)).await
    }

    async fn serve(state: AppState, stores: Option<InMemoryContext>) -> Result<Self> {
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            stores,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with a bearer token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a bodyless POST, optionally presenting a refresh token cookie
    pub async fn post_with_cookie(&self, path: &str, refresh_token: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        let mut request = self.client.post(&url);
        if let Some(token) = refresh_token {
            request = request.header(header::COOKIE, format!("{REFRESH_COOKIE}={token}"));
        }
        Ok(request.send().await?)
    }
}

/// Configuration with a generous rate limit and a non-`Secure` cookie
pub fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "dairy-auth-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
            min_connections: 1,
            run_migrations: true,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry: 900,
        },
        refresh_token: RefreshTokenConfig {
            ttl_days: 7,
            sweep_interval_secs: 0,
            cookie_secure: false,
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 1000,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        snowflake: SnowflakeConfig { worker_id: 1 },
    }
}

fn database_url() -> Result<String> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL not set"))
}

/// Helper to check if a database is available
pub fn check_test_env() -> bool {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }
    true
}

/// The raw `Set-Cookie` header for the refresh token, if the response set one
pub fn refresh_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{REFRESH_COOKIE}=")))
        .map(str::to_string)
}

/// The refresh token value carried by the response's `Set-Cookie`
pub fn refresh_token_of(response: &Response) -> Option<String> {
    let header = refresh_set_cookie(response)?;
    let pair = header.split(';').next()?;
    let value = pair.split_once('=')?.1.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
