//! Route selection and forwarding tests
//!
//! Exercises the full request path against mock upstreams: path
//! translation, credential passthrough, model-based alternate routing,
//! and the restricted-model rejection filter.

use axum::http::{header, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_string, header as header_matcher, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, constants};

#[tokio::test]
async fn test_forwards_to_default_upstream_with_path_translation() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .and(header_matcher("Authorization", constants::TEST_AUTH_HEADER))
        .and(body_json(json!({"model": "gpt-3.5"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "chat.completion"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::test_server(common::test_config(&upstream.uri(), &alternate.uri()));

    let response = server
        .post("/api/openai/v1/chat")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static(constants::TEST_AUTH_HEADER),
        )
        .json(&json!({"model": "gpt-3.5"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"object": "chat.completion"}));

    // The alternate upstream was never consulted
    assert!(alternate.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_query_string_relayed_verbatim() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(query_param("limit", "5"))
        .and(query_param("after", "model-x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::test_server(common::test_config(&upstream.uri(), &alternate.uri()));

    let response = server.get("/api/openai/v1/models?limit=5&after=model-x").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_empty_body_forwards_to_default_upstream() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::test_server(common::test_config(&upstream.uri(), &alternate.uri()));

    let response = server.post("/api/openai/v1/chat").await;

    response.assert_status_ok();
    assert!(alternate.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_forwards_unmodified() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    // A body that fails to parse as JSON is relayed byte-for-byte, never
    // rejected
    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .and(body_string("not json{{"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = common::test_config(&upstream.uri(), &alternate.uri());
    config.disable_gpt4 = true;
    let server = common::test_server(config);

    let response = server
        .post("/api/openai/v1/chat")
        .bytes("not json{{".into())
        .content_type("application/json")
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_restricted_model_routes_to_alternate_upstream() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/completions/gpt-4"))
        .and(header_matcher("x-token", constants::TEST_XAI_TOKEN))
        .and(body_json(json!({"model": "gpt-4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routed": "alternate"})))
        .expect(1)
        .mount(&alternate)
        .await;

    let server = common::test_server(common::test_config(&upstream.uri(), &alternate.uri()));

    let response = server
        .post("/api/openai/v1/chat/completions")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static(constants::TEST_AUTH_HEADER),
        )
        .json(&json!({"model": "gpt-4"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"routed": "alternate"}));

    // The default upstream was never consulted
    assert!(upstream.received_requests().await.unwrap().is_empty());

    // The inbound credential must not leak to the alternate upstream
    let requests = alternate.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_alternate_routing_wins_over_disablement_filter() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/completions/gpt-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routed": "alternate"})))
        .expect(1)
        .mount(&alternate)
        .await;

    let mut config = common::test_config(&upstream.uri(), &alternate.uri());
    config.disable_gpt4 = true;
    let server = common::test_server(config);

    let response = server
        .post("/api/openai/v1/chat/completions")
        .json(&json!({"model": "gpt-4"}))
        .await;

    // Exact match still goes to the alternate upstream, not the 403 path
    response.assert_status_ok();
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disabled_substring_model_is_rejected() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    let mut config = common::test_config(&upstream.uri(), &alternate.uri());
    config.disable_gpt4 = true;
    let server = common::test_server(config);

    let response = server
        .post("/api/openai/v1/chat/completions")
        .json(&json!({"model": "gpt-4-vision"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&json!({
        "error": true,
        "message": "you are not allowed to use gpt-4 model"
    }));

    // Rejection short-circuits before any outbound call
    assert!(upstream.received_requests().await.unwrap().is_empty());
    assert!(alternate.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_substring_model_forwards_when_filter_disabled() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({"model": "gpt-4-vision"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::test_server(common::test_config(&upstream.uri(), &alternate.uri()));

    let response = server
        .post("/api/openai/v1/chat/completions")
        .json(&json!({"model": "gpt-4-vision"}))
        .await;

    response.assert_status_ok();
    assert!(alternate.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_method_is_passed_through() {
    let upstream = MockServer::start().await;
    let alternate = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/files/file-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::test_server(common::test_config(&upstream.uri(), &alternate.uri()));

    let response = server.delete("/api/openai/v1/files/file-abc").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({"deleted": true}));
}
