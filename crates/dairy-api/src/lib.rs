//! # dairy-api
//!
//! REST API server built with Axum: the HTTP face of the credential core.

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, spawn_refresh_token_sweeper};
pub use state::AppState;
