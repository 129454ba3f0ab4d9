//! Dairy auth API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p dairy-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` if present).

use dairy_common::{try_init_tracing, AppConfig, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Environment decides the log format, so read it before anything else
    let config = AppConfig::from_env();
    let env = config
        .as_ref()
        .map_or(Environment::default(), |c| c.app.env);

    if let Err(e) = try_init_tracing(&TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {}", e);
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        "Configuration loaded"
    );

    if let Err(e) = dairy_api::run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}
