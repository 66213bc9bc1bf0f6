//! Alternate upstream proxy
//!
//! Handles request forwarding to the separately configured alternate
//! completion API used for the restricted model. The alternate upstream
//! has its own credential scheme (`x-token`); the inbound credential is
//! never forwarded here.

use axum::body::Body;
use axum::http::{Method, Response};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::relay_response,
};

/// Credential header expected by the alternate upstream
const X_TOKEN: HeaderName = HeaderName::from_static("x-token");

/// Fixed completions path on the alternate upstream
///
/// Appended directly to the configured host value, which is expected to
/// end with a separator.
const COMPLETIONS_PATH: &str = "ai/completions/gpt-4";

/// Client for the alternate upstream
pub struct XaiClient {
    client: reqwest::Client,
    host: String,
    token: String,
}

impl XaiClient {
    /// Create a new alternate upstream client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            host: config.xai_api_host.clone(),
            token: config.xai_api_token.clone(),
        }
    }

    /// Forward a request to the alternate upstream's fixed completions path
    ///
    /// The call is bound to `deadline`, sharing the timer started at
    /// request entry.
    pub async fn forward(
        &self,
        method: Method,
        body: Bytes,
        deadline: tokio::time::Instant,
    ) -> AppResult<Response<Body>> {
        let url = format!("{}{}", self.host, COMPLETIONS_PATH);
        info!(url = %url, method = %method, "Forwarding request to alternate upstream");

        debug!(
            url = %url,
            method = %method,
            body_len = body.len(),
            "Sending request to alternate upstream"
        );

        let request_builder = self
            .client
            .request(
                reqwest::Method::from_bytes(method.as_str().as_bytes())
                    .unwrap_or(reqwest::Method::POST),
                &url,
            )
            .headers(self.build_headers())
            .body(body);

        let response = tokio::time::timeout_at(deadline, request_builder.send())
            .await
            .map_err(|_| {
                error!(url = %url, "Request to alternate upstream timed out");
                AppError::UpstreamTimeout
            })?
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send request to alternate upstream");
                e
            })?;

        debug!(
            url = %url,
            status = %response.status(),
            "Received response from alternate upstream"
        );

        Ok(relay_response(response))
    }

    /// Build headers for the alternate upstream request
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            X_TOKEN,
            HeaderValue::from_str(&self.token).expect("Invalid XAI_API_TOKEN value"),
        );

        headers
    }
}
