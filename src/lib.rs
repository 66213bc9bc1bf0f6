//! Switchboard - model-routing proxy for completion APIs
//!
//! This library provides the core functionality for the Switchboard proxy
//! server. It forwards completion requests to one of two upstream APIs,
//! selecting the destination based on the requested model, and sanitizes
//! response headers before relaying them to the client.

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;

use std::time::Instant;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::proxy::{OpenAIClient, RouteDecision, XaiClient};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling. No client-level
        // timeout: each request carries its own deadline, and streamed
        // response bodies may outlive it.
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .build()?;

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
        })
    }
}
