//! Server setup and initialization
//!
//! Provides the application builder, the expired-token sweeper, and the
//! server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use dairy_common::{AppConfig, AppError, JwtService};
use dairy_core::SnowflakeGenerator;
use dairy_db::{create_pool, run_migrations, PoolSettings};
use dairy_service::ServiceContext;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health routes get tracing but skip the rate limiter so probes are never
/// throttled.
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    let health = apply_middleware(health_routes());

    api.merge(health).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolSettings::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContext::with_postgres(
        pool,
        config.refresh_token.ttl_days,
        jwt_service,
        snowflake_generator,
    );

    Ok(AppState::new(service_context, config))
}

/// Periodically delete expired refresh tokens.
///
/// Returns `None` when `interval_secs` is zero. A failed sweep is logged and
/// retried on the next tick.
pub fn spawn_refresh_token_sweeper(state: &AppState, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        info!("Refresh token sweeper disabled");
        return None;
    }

    let state = state.clone();
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match state
                .service_context()
                .refresh_token_store()
                .purge_expired()
                .await
            {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired refresh tokens"),
                Err(e) => warn!(error = %e, "Refresh token sweep failed"),
            }
        }
    }))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {}", e)))?;
    let sweep_interval = config.refresh_token.sweep_interval_secs;

    let state = create_app_state(config).await?;
    let sweeper = spawn_refresh_token_sweeper(&state, sweep_interval);

    let app = create_app(state);
    let result = run_server(app, addr).await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
