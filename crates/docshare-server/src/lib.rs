//! docshare-server: HTTP API server for Docshare
//!
//! This crate provides:
//! - REST endpoints for documents, sharing, version history and user lookup
//! - Registration and login with argon2 password hashes and JWT sessions
//! - JSON error responses
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docshare_server::{build_app, config::ServerConfig, state::AppState};
//! use docshare_store::{Store, StoreConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let app = build_app(AppState::new(Arc::new(store), config.clone()), &config)?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, body::Body};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{make_request_span, propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use docshare_core;
pub use docshare_store;

/// Build the router with the full middleware stack.
pub fn build_app(state: AppState, config: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(&config.cors_allowed_origins)?;

    let trace = TraceLayer::new_for_http().make_span_with(make_request_span::<Body>);

    Ok(routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(trace)
        .layer(request_id_layer())
        .layer(cors))
}

/// Build CORS layer from configuration.
pub fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    if allowed_origins == "*" {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    // Parse comma-separated origins
    let origins = allowed_origins
        .split(',')
        .map(|s| {
            s.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: format!("invalid origin: {s}"),
            })
        })
        .collect::<Result<Vec<http::HeaderValue>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
