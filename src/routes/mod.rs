//! HTTP routes for Switchboard
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod forward;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        // Any method, any path under the mount prefix
        .route("/api/openai", any(forward::forward_handler))
        .route("/api/openai/*path", any(forward::forward_handler))
        // Global middleware (applied to all routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
