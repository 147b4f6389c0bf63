//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /api/analyze` for single-video and keyword batch analysis
//! - `POST /api/script` for ad-script composition
//! - Input screening, per-client rate limiting and a usage-quota hook
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, UnlimitedQuota, UsageQuota};
