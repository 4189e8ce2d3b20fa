//! Axum HTTP API server.
//!
//! This crate provides:
//! - Reel submission, status, download, preview and deletion
//! - Health endpoints reporting configured providers
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod range;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, ProviderStatus};
