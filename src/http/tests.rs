//! Tests for the HTTP module

use super::*;
use crate::error::Error;
use crate::testing::{exhausted, ok, records, RecordingTimer, ScriptedTransport, BASE};
use crate::types::TokenPlacement;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scripted_client(transport: &Arc<ScriptedTransport>, timer: &Arc<RecordingTimer>) -> ApiClient {
    let config = ClientConfig::builder().endpoint(BASE).build();
    ApiClient::with_transport(config, Arc::clone(transport) as Arc<dyn Transport>)
        .with_timer(Arc::clone(timer) as Arc<dyn Timer>)
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();
    assert_eq!(config.endpoint, "https://api.github.com");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.per_page, 100);
    assert_eq!(config.backoff, BackoffPolicy::default());
    assert!(config.access_token.is_none());
    assert!(config.throttle.is_none());
    assert!(config.user_agent.starts_with("starfetch/"));
}

#[test]
fn test_client_config_builder() {
    let config = ClientConfig::builder()
        .endpoint("https://ghe.example.com/api/v3")
        .timeout(Duration::from_secs(60))
        .per_page(50)
        .backoff(BackoffPolicy::new(
            Duration::from_secs(1),
            Duration::from_secs(60),
        ))
        .access_token("abc")
        .token_placement(TokenPlacement::Header)
        .throttle(ThrottleConfig::per_second(5))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.endpoint, "https://ghe.example.com/api/v3");
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.per_page, 50);
    assert_eq!(config.backoff.ceiling, Duration::from_secs(60));
    assert_eq!(config.access_token.as_deref(), Some("abc"));
    assert_eq!(config.token_placement, TokenPlacement::Header);
    assert_eq!(config.throttle, Some(ThrottleConfig::new(5, 5)));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

// ============================================================================
// EndpointRequest / URL Tests
// ============================================================================

#[test]
fn test_endpoint_request_params() {
    let request = EndpointRequest::new("users/alice/starred")
        .page(1, 100)
        .param("page", 2)
        .param("sort", "created");

    assert_eq!(request.handler(), "users/alice/starred");
    assert_eq!(
        request.params(),
        &[
            ("per_page".to_string(), "100".to_string()),
            ("page".to_string(), "2".to_string()),
            ("sort".to_string(), "created".to_string()),
        ]
    );
}

#[test]
fn test_build_url_with_query_token() {
    let config = ClientConfig::builder()
        .endpoint("https://api.github.com/")
        .access_token("s3cr3t")
        .build();
    let client = ApiClient::with_transport(config, Arc::new(ScriptedTransport::new()));

    let url = client
        .build_url(&EndpointRequest::new("/repos/a/b/stargazers").page(3, 100))
        .unwrap();

    assert_eq!(
        url.as_str(),
        "https://api.github.com/repos/a/b/stargazers?per_page=100&page=3&access_token=s3cr3t"
    );
}

#[test]
fn test_build_url_encodes_values() {
    let client = ApiClient::with_transport(
        ClientConfig::builder().endpoint(BASE).build(),
        Arc::new(ScriptedTransport::new()),
    );

    let url = client
        .build_url(&EndpointRequest::new("search").param("q", "a&b=c"))
        .unwrap();
    assert_eq!(url.query(), Some("q=a%26b%3Dc"));
}

#[test]
fn test_build_url_without_params() {
    let client = ApiClient::with_transport(
        ClientConfig::builder().endpoint(BASE).build(),
        Arc::new(ScriptedTransport::new()),
    );
    let url = client.build_url(&EndpointRequest::new("user")).unwrap();
    assert_eq!(url.as_str(), "https://api.test/user");
}

#[test]
fn test_build_url_header_token_not_in_query() {
    let config = ClientConfig::builder()
        .endpoint(BASE)
        .access_token("s3cr3t")
        .token_placement(TokenPlacement::Header)
        .build();
    let client = ApiClient::with_transport(config, Arc::new(ScriptedTransport::new()));
    let url = client.build_url(&EndpointRequest::new("user")).unwrap();
    assert!(url.query().is_none());
}

#[tokio::test]
async fn test_empty_handler_rejected() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = scripted_client(&transport, &Arc::new(RecordingTimer::default()));

    let err = client.request(&EndpointRequest::new("/")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));
    assert_eq!(transport.call_count(), 0);
}

// ============================================================================
// Request Unit Tests (scripted transport)
// ============================================================================

#[tokio::test]
async fn test_request_success_publishes_rate_limit() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("user", None, ok(json!({"login": "alice"})));
    let client = scripted_client(&transport, &Arc::new(RecordingTimer::default()));

    let envelope = client.request(&EndpointRequest::new("user")).await.unwrap();

    assert_eq!(envelope.body["login"], "alice");
    assert_eq!(client.rate_limits().latest(), Some(RateLimit::new(5000, 4999)));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_backoff_doubles_until_success() {
    let transport = Arc::new(ScriptedTransport::new());
    for _ in 0..4 {
        transport.respond("users/alice/starred", Some(1), exhausted());
    }
    transport.respond("users/alice/starred", Some(1), ok(records(0, 3)));
    let timer = Arc::new(RecordingTimer::default());
    let client = scripted_client(&transport, &timer);

    let envelope = client
        .request(&EndpointRequest::new("users/alice/starred").page(1, 100))
        .await
        .unwrap();

    assert_eq!(envelope.body.as_array().unwrap().len(), 3);
    assert_eq!(transport.call_count(), 5);
    assert_eq!(
        timer.sleeps(),
        vec![
            Duration::from_secs(10),
            Duration::from_secs(20),
            Duration::from_secs(40),
            Duration::from_secs(80),
        ]
    );
}

#[tokio::test]
async fn test_backoff_never_exceeds_ceiling() {
    let transport = Arc::new(ScriptedTransport::new());
    for _ in 0..12 {
        transport.respond("user", None, exhausted());
    }
    transport.respond("user", None, ok(json!({})));
    let timer = Arc::new(RecordingTimer::default());
    let client = scripted_client(&transport, &timer);

    client.request(&EndpointRequest::new("user")).await.unwrap();

    let sleeps = timer.sleeps();
    assert_eq!(sleeps.len(), 12);
    assert!(sleeps.iter().all(|d| *d <= Duration::from_secs(1800)));
    assert_eq!(sleeps.last(), Some(&Duration::from_secs(1800)));
    for pair in sleeps.windows(2) {
        assert!(pair[1] == pair[0] * 2 || pair[1] == Duration::from_secs(1800));
    }
}

#[tokio::test]
async fn test_exhausted_snapshot_published_during_backoff() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("user", None, exhausted());
    transport.respond("user", None, ok(json!({})));
    let client = scripted_client(&transport, &Arc::new(RecordingTimer::default()));
    let mut rx = client.rate_limits().subscribe();

    client.request(&EndpointRequest::new("user")).await.unwrap();

    // The receiver observed at least one change; the latest value is the 200's snapshot.
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), Some(RateLimit::new(5000, 4999)));
}

#[tokio::test]
async fn test_forbidden_with_quota_left_is_terminal() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(
        "repos/a/b/stargazers",
        Some(1),
        Envelope::new(403, json!({"message": "Forbidden"}))
            .with_header("X-RateLimit-Limit", "60")
            .with_header("X-RateLimit-Remaining", "12"),
    );
    let timer = Arc::new(RecordingTimer::default());
    let client = scripted_client(&transport, &timer);

    let err = client
        .request(&EndpointRequest::new("repos/a/b/stargazers").page(1, 100))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(timer.sleeps().is_empty());
    assert_eq!(client.rate_limits().latest(), Some(RateLimit::new(60, 12)));
}

#[tokio::test]
async fn test_forbidden_without_rate_limit_headers_is_terminal() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("user", None, Envelope::new(403, json!({"message": "nope"})));
    let timer = Arc::new(RecordingTimer::default());
    let client = scripted_client(&transport, &timer);

    let err = client.request(&EndpointRequest::new("user")).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(timer.sleeps().is_empty());
    assert_eq!(client.rate_limits().latest(), None);
}

#[tokio::test]
async fn test_not_found_carries_body() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = scripted_client(&transport, &Arc::new(RecordingTimer::default()));

    let err = client
        .request(&EndpointRequest::new("repos/nobody/nothing/stargazers"))
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body["message"], "Not Found");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_not_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("user", None, "connection refused");
    let timer = Arc::new(RecordingTimer::default());
    let client = scripted_client(&transport, &timer);

    let err = client.request(&EndpointRequest::new("user")).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(transport.call_count(), 1);
    assert!(timer.sleeps().is_empty());
}

#[tokio::test]
async fn test_throttled_client_still_requests() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("user", None, ok(json!({})));
    let config = ClientConfig::builder()
        .endpoint(BASE)
        .throttle(ThrottleConfig::new(100, 10))
        .build();
    let client = ApiClient::with_transport(config, Arc::clone(&transport) as Arc<dyn Transport>);
    assert!(client.has_throttle());

    for _ in 0..3 {
        client.request(&EndpointRequest::new("user")).await.unwrap();
    }
    assert_eq!(transport.call_count(), 3);
}

// ============================================================================
// Reqwest Transport Tests (wiremock)
// ============================================================================

#[tokio::test]
async fn test_reqwest_transport_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/alice/starred"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Limit", "60")
                .insert_header("X-RateLimit-Remaining", "59")
                .insert_header("Link", r#"<http://x/?page=2>; rel="next""#)
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig::builder().endpoint(mock_server.uri()).build();
    let client = ApiClient::new(config).unwrap();
    let envelope = client
        .request(&EndpointRequest::new("users/alice/starred").page(1, 100))
        .await
        .unwrap();

    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.body, json!([{"id": 1}]));
    assert_eq!(envelope.rate_limit(), Some(RateLimit::new(60, 59)));
    assert_eq!(envelope.link_header(), Some(r#"<http://x/?page=2>; rel="next""#));
}

#[tokio::test]
async fn test_reqwest_transport_authorization_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "token s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::builder()
        .endpoint(mock_server.uri())
        .access_token("s3cr3t")
        .token_placement(TokenPlacement::Header)
        .build();
    let client = ApiClient::new(config).unwrap();
    let envelope = client.request(&EndpointRequest::new("user")).await.unwrap();

    assert_eq!(envelope.body["login"], "alice");
}

#[tokio::test]
async fn test_reqwest_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Limit", "60")
                .insert_header("X-RateLimit-Remaining", "0")
                .set_body_json(json!({"message": "API rate limit exceeded"})),
        )
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Limit", "60")
                .insert_header("X-RateLimit-Remaining", "60")
                .set_body_json(json!({"ok": true})),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig::builder()
        .endpoint(mock_server.uri())
        .backoff(BackoffPolicy::new(
            Duration::from_millis(5),
            Duration::from_millis(50),
        ))
        .build();
    let client = ApiClient::new(config).unwrap();
    let envelope = client.request(&EndpointRequest::new("user")).await.unwrap();

    assert_eq!(envelope.body["ok"], true);
    assert_eq!(client.rate_limits().latest(), Some(RateLimit::new(60, 60)));
}

#[tokio::test]
async fn test_reqwest_server_error_is_terminal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(ClientConfig::builder().endpoint(mock_server.uri()).build())
        .unwrap();
    let err = client.request(&EndpointRequest::new("user")).await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, json!("Server error"));
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn test_api_client_debug() {
    let client = ApiClient::with_transport(
        ClientConfig::builder().access_token("hidden").build(),
        Arc::new(ScriptedTransport::new()),
    );
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("ApiClient"));
    assert!(debug_str.contains("has_token: true"));
    assert!(!debug_str.contains("hidden"));
}
