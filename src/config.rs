//! Configuration management for Switchboard
//!
//! Configuration is loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default scheme prepended to `BASE_URL` when it does not carry one
const DEFAULT_PROTOCOL: &str = "https";

/// Default upstream origin for completion requests
const DEFAULT_BASE_URL: &str = "api.openai.com";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Scheme used when `base_url` does not declare one
    pub protocol: String,
    /// Default upstream origin (with or without scheme)
    pub base_url: String,
    /// Organization identifier attached to default upstream requests
    pub openai_org_id: Option<String>,

    /// Reject requests whose model contains the restricted identifier
    pub disable_gpt4: bool,

    /// Alternate upstream host for restricted-model requests
    pub xai_api_host: String,
    /// Credential sent to the alternate upstream under `x-token`
    pub xai_api_token: String,

    /// Hard per-request timeout for outbound calls (in seconds)
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SWITCHBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SWITCHBOARD_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid SWITCHBOARD_PORT")?,

            protocol: env::var("PROTOCOL").unwrap_or_else(|_| DEFAULT_PROTOCOL.to_string()),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            openai_org_id: env::var("OPENAI_ORG_ID").ok().filter(|v| !v.is_empty()),

            // Any non-empty value enables the filter
            disable_gpt4: env::var("DISABLE_GPT4")
                .map(|v| !v.is_empty())
                .unwrap_or(false),

            xai_api_host: env::var("XAI_API_HOST").unwrap_or_default(),
            xai_api_token: env::var("XAI_API_TOKEN").unwrap_or_default(),

            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .context("Invalid REQUEST_TIMEOUT_SECS")?,
        })
    }

    /// Resolve the default upstream base URL
    ///
    /// The configured value is used as-is when it already declares a scheme;
    /// otherwise the configured protocol is prepended.
    pub fn resolved_base_url(&self) -> String {
        if self.base_url.starts_with("http") {
            self.base_url.clone()
        } else {
            format!("{}://{}", self.protocol, self.base_url)
        }
    }

    /// Hard deadline applied to each outbound call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
