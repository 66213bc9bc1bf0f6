//! Proxy module
//!
//! Handles routing decisions and request forwarding to the upstream
//! completion APIs.

pub mod headers;
pub mod openai;
pub mod router;
pub mod xai;

pub use openai::OpenAIClient;
pub use router::{decide, RouteDecision, RESTRICTED_MODEL};
pub use xai::XaiClient;

use axum::body::Body;
use axum::http::{Response, StatusCode};

use crate::proxy::headers::sanitize_response_headers;

/// Convert an upstream response into the response relayed to the caller
///
/// Status is copied verbatim, headers are sanitized, and the body is
/// streamed rather than buffered so large and long-lived responses pass
/// through without accumulating in memory.
pub fn relay_response(response: reqwest::Response) -> Response<Body> {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = sanitize_response_headers(response.headers());

    let mut relayed = Response::new(Body::from_stream(response.bytes_stream()));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;
    relayed
}
