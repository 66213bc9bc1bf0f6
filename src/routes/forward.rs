//! Forwarding handler
//!
//! Entry point for all requests under the `/api/openai` mount prefix.
//! Buffers the inbound body, decides a route based on the declared model,
//! issues at most one outbound call under the request deadline, and relays
//! the sanitized response.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::BodyExt;
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, ErrorResponse},
    proxy::{self, OpenAIClient, RouteDecision, XaiClient},
    AppState,
};

/// Mount prefix stripped from inbound paths before forwarding
const MOUNT_PREFIX: &str = "/api/openai";

/// Translate the inbound URI into the upstream-relative path
///
/// Strips the mount prefix and keeps the query string verbatim. The result
/// carries no leading slash; the caller joins it onto the upstream origin.
fn upstream_path_and_query(uri: &Uri) -> String {
    let path = uri.path();
    let relative = path
        .strip_prefix(MOUNT_PREFIX)
        .map(|rest| rest.strip_prefix('/').unwrap_or(rest))
        .unwrap_or(path);

    match uri.query() {
        Some(query) => format!("{relative}?{query}"),
        None => relative.to_string(),
    }
}

/// Forward a request to the upstream selected by its model field
///
/// This handler:
/// 1. Buffers the request body once; every later inspection reads the buffer
/// 2. Decides between the default upstream, the alternate upstream, and
///    outright rejection
/// 3. Issues at most one outbound call, bound to the request deadline
/// 4. Relays the sanitized upstream response
pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    request: axum::extract::Request,
) -> Result<Response, AppError> {
    // The deadline is fixed at request entry and shared by whichever
    // outbound call the route decision selects.
    let deadline = tokio::time::Instant::now() + state.config.request_timeout();

    let path_and_query = upstream_path_and_query(&uri);
    let auth = headers.get(header::AUTHORIZATION).cloned();

    info!(
        method = %method,
        path = %uri.path(),
        upstream_path = %path_and_query,
        base_url = %state.config.resolved_base_url(),
        "Processing forward request"
    );
    if let Some(org_id) = &state.config.openai_org_id {
        debug!(org_id = %org_id, "Organization header enabled");
    }

    // Buffer the body once up front. Routing inspects these bytes and the
    // outbound call reuses them, so the stream is never read twice.
    let body = request
        .into_body()
        .collect()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to read request body: {}", e)))?
        .to_bytes();

    match proxy::decide(&body, state.config.disable_gpt4) {
        RouteDecision::Reject { status, message } => {
            warn!(%status, "Rejecting request for disabled model");
            Ok((status, Json(ErrorResponse::new(message))).into_response())
        }
        RouteDecision::Alternate => {
            info!("Routing request to alternate upstream");
            let client = XaiClient::new(state.http_client.clone(), &state.config);
            client.forward(method, body, deadline).await
        }
        RouteDecision::Default => {
            let client = OpenAIClient::new(state.http_client.clone(), &state.config);
            client
                .forward(method, &path_and_query, auth.as_ref(), body, deadline)
                .await
        }
    }
}
