//! Upstream routing decisions
//!
//! Inspects the buffered request body and decides which upstream receives
//! the request, or whether it is rejected outright.

use axum::http::StatusCode;
use serde::Deserialize;

/// Model identifier subject to alternate routing and the disablement filter
pub const RESTRICTED_MODEL: &str = "gpt-4";

/// Where a request goes, decided once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Forward to the default upstream, path and body unchanged
    Default,
    /// Forward to the alternate upstream at its fixed completions path
    Alternate,
    /// Answer the caller directly without an outbound call
    Reject { status: StatusCode, message: String },
}

/// Minimal probe for the one body field routing cares about
///
/// Decode failure is treated as the field being absent, never as an error.
#[derive(Debug, Deserialize)]
struct ModelProbe {
    model: Option<String>,
}

/// Decide the route for a request body
///
/// Pure function of the buffered body and the disablement flag:
/// - empty or unparseable bodies always go to the default upstream;
/// - an exact match on the restricted model goes to the alternate upstream,
///   taking precedence over the disablement filter;
/// - otherwise, with the filter enabled, any model *containing* the
///   restricted identifier is rejected with 403.
pub fn decide(body: &[u8], disable_gpt4: bool) -> RouteDecision {
    if body.is_empty() {
        return RouteDecision::Default;
    }

    let model = serde_json::from_slice::<ModelProbe>(body)
        .ok()
        .and_then(|probe| probe.model);

    match model {
        Some(model) if model == RESTRICTED_MODEL => RouteDecision::Alternate,
        Some(model) if disable_gpt4 && model.contains(RESTRICTED_MODEL) => {
            RouteDecision::Reject {
                status: StatusCode::FORBIDDEN,
                message: format!("you are not allowed to use {RESTRICTED_MODEL} model"),
            }
        }
        _ => RouteDecision::Default,
    }
}
