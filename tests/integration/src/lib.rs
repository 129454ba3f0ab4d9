//! Integration test utilities for the auth server
//!
//! Spawns the real router on a local port and drives it over HTTP, either
//! on in-memory stores or against PostgreSQL when `DATABASE_URL` is set.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
