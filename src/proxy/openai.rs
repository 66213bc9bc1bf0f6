//! Default upstream proxy
//!
//! Handles request forwarding to the default completion API. The inbound
//! credential is passed through verbatim; path and query arrive already
//! stripped of the handler's mount prefix.

use axum::body::Body;
use axum::http::{Method, Response};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::relay_response,
};

/// Organization passthrough header for the default upstream
const OPENAI_ORGANIZATION: HeaderName = HeaderName::from_static("openai-organization");

/// Client for the default upstream
pub struct OpenAIClient {
    client: reqwest::Client,
    base_url: String,
    org_id: Option<String>,
}

impl OpenAIClient {
    /// Create a new default upstream client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.resolved_base_url(),
            org_id: config.openai_org_id.clone(),
        }
    }

    /// Forward a request to the default upstream
    ///
    /// `path_and_query` is relative to the upstream origin. The call is
    /// bound to `deadline`; if it fires, the in-flight request is dropped
    /// and the caller sees a gateway timeout.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        auth: Option<&HeaderValue>,
        body: Bytes,
        deadline: tokio::time::Instant,
    ) -> AppResult<Response<Body>> {
        let url = format!("{}/{}", self.base_url, path_and_query);
        info!(url = %url, method = %method, "Forwarding request to default upstream");

        let headers = self.build_proxy_headers(auth);

        debug!(
            url = %url,
            method = %method,
            body_len = body.len(),
            "Sending request to default upstream"
        );

        let mut request_builder = self.client.request(
            reqwest::Method::from_bytes(method.as_str().as_bytes())
                .unwrap_or(reqwest::Method::POST),
            &url,
        );
        request_builder = request_builder.headers(headers);

        // Only add body for methods that support it
        if method != Method::GET && method != Method::HEAD {
            request_builder = request_builder.body(body);
        }

        let response = tokio::time::timeout_at(deadline, request_builder.send())
            .await
            .map_err(|_| {
                error!(url = %url, "Request to default upstream timed out");
                AppError::UpstreamTimeout
            })?
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send request to default upstream");
                e
            })?;

        debug!(
            url = %url,
            status = %response.status(),
            "Received response from default upstream"
        );

        Ok(relay_response(response))
    }

    /// Build headers for the outbound request
    ///
    /// The inbound credential is copied verbatim, without validation or
    /// transformation.
    fn build_proxy_headers(&self, auth: Option<&HeaderValue>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(value) = auth {
            headers.insert(AUTHORIZATION, value.clone());
        }

        if let Some(org_id) = &self.org_id {
            headers.insert(
                OPENAI_ORGANIZATION,
                HeaderValue::from_str(org_id).expect("Invalid OPENAI_ORG_ID value"),
            );
        }

        headers
    }
}
