//! Response header sanitization
//!
//! Rewrites upstream response headers before they are relayed to the
//! original caller.

use axum::http::header::{self, HeaderName};
use reqwest::header::{HeaderMap, HeaderValue};

/// Header instructing intermediary proxies (nginx) not to buffer the response
pub const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Hop-by-hop headers that must never be relayed
///
/// Connection framing is re-established on the client side of the relay.
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Check if a header is a hop-by-hop header that should not be relayed
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
}

/// Sanitize upstream response headers for relay to the client
///
/// Copies all headers except hop-by-hop headers and `www-authenticate`
/// (which would make browsers prompt for credentials), then forces
/// `X-Accel-Buffering: no` regardless of what the upstream sent.
pub fn sanitize_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut sanitized = HeaderMap::new();

    for (name, value) in upstream {
        if is_hop_by_hop_header(name)
            || *name == header::WWW_AUTHENTICATE
            || *name == X_ACCEL_BUFFERING
        {
            continue;
        }
        // append keeps repeated headers (set-cookie) intact
        sanitized.append(name.clone(), value.clone());
    }

    sanitized.insert(X_ACCEL_BUFFERING, HeaderValue::from_static("no"));

    sanitized
}
