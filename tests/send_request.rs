//! Request dispatch tests.
//!
//! Uses the in-memory transport to check what the client hands over and
//! how it interprets the answer.

use std::time::Duration;

use serde_json::json;
use tgapi::{
    MockTransport, Payload, Request, ScriptedResponse, SendOptions, TelegramClient,
    TelegramError,
};

fn client_with(transport: &MockTransport) -> TelegramClient {
    TelegramClient::with_transport(transport.clone())
}

// =============================================================================
// Success path
// =============================================================================

#[tokio::test]
async fn test_get_me_end_to_end() {
    let transport = MockTransport::new()
        .respond_with(ScriptedResponse::ok(json!({"id": 1, "is_bot": true, "username": "t1_bot"})));
    let mut client = client_with(&transport);

    let response = client
        .send_request(&Request::new("T1", "getMe"))
        .await
        .unwrap();

    assert!(!response.is_error());
    assert_eq!(response.status(), Some(200));
    assert_eq!(
        response.result(),
        Some(&json!({"id": 1, "is_bot": true, "username": "t1_bot"}))
    );

    let call = transport.last_call().unwrap();
    assert_eq!(call.url, "https://api.telegram.org/bot/botT1/getMe");
    assert_eq!(call.method, "GET");
    assert!(!call.is_async);
}

#[tokio::test]
async fn test_get_sends_query_params() {
    let transport = MockTransport::new();
    let mut client = client_with(&transport);
    let request = Request::new("t", "getUpdates")
        .with_query_param("offset", 5)
        .with_post_param("unused", true);

    client.send_request(&request).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(
        call.options,
        SendOptions::with_payload(Payload::Query(request.query_params().clone()))
    );
    assert!(call.options.sink.is_none());
}

#[tokio::test]
async fn test_post_sends_body_params() {
    let transport = MockTransport::new();
    let mut client = client_with(&transport);
    let request = Request::new("t", "sendMessage")
        .with_method("POST")
        .with_header("x-request-id", "abc")
        .with_post_param("chat_id", 99)
        .with_post_param("text", "hello");

    client.send_request(&request).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(call.method, "POST");
    assert_eq!(
        call.options.payload,
        Some(Payload::Body(request.post_params().clone()))
    );
    assert_eq!(call.headers.get("x-request-id").map(String::as_str), Some("abc"));
}

#[tokio::test]
async fn test_lowercase_post_falls_back_to_query() {
    let transport = MockTransport::new();
    let mut client = client_with(&transport);
    let request = Request::new("t", "sendMessage")
        .with_method("post")
        .with_query_param("q", "x")
        .with_post_param("text", "hello");

    client.send_request(&request).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(call.method, "post");
    assert_eq!(
        call.options.payload,
        Some(Payload::Query(request.query_params().clone()))
    );
}

#[tokio::test]
async fn test_timeouts_are_configured_before_send() {
    let transport = MockTransport::new();
    let mut client = client_with(&transport);
    let request = Request::new("t", "getMe")
        .with_timeout(Duration::from_secs(7))
        .with_connect_timeout(Duration::from_secs(3));

    client.send_request(&request).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(call.timeout, Some(Duration::from_secs(7)));
    assert_eq!(call.connect_timeout, Some(Duration::from_secs(3)));
}

#[tokio::test]
async fn test_response_keeps_original_request() {
    let transport = MockTransport::new();
    let mut client = client_with(&transport);
    let request = Request::new("t", "getChat").with_query_param("chat_id", 1);

    let response = client.send_request(&request).await.unwrap();

    assert_eq!(response.request(), &request);
}

// =============================================================================
// Error path
// =============================================================================

#[tokio::test]
async fn test_api_error_is_returned_as_built_by_response() {
    let body = json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"});
    let transport = MockTransport::new().respond_with(ScriptedResponse::json(400, body.clone()));
    let mut client = client_with(&transport);

    let err = client
        .send_request(&Request::new("t", "sendMessage"))
        .await
        .unwrap_err();

    let expected = TelegramError::from_api_body(&body, 400);
    assert_eq!(err.to_string(), expected.to_string());
    assert_eq!(err.code(), Some(400));
    assert!(matches!(err, TelegramError::ApiError { .. }));
}

#[tokio::test]
async fn test_ok_false_with_200_is_still_an_error() {
    let transport = MockTransport::new().respond_with(ScriptedResponse::json(
        200,
        json!({"ok": false, "description": "weird"}),
    ));
    let mut client = client_with(&transport);

    let err = client
        .send_request(&Request::new("t", "getMe"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Telegram API error: weird");
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn test_flood_control_is_rate_limited() {
    let transport = MockTransport::new().respond_with(ScriptedResponse::json(
        429,
        json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 3",
            "parameters": {"retry_after": 3}
        }),
    ));
    let mut client = client_with(&transport);

    let err = client
        .send_request(&Request::new("t", "sendMessage"))
        .await
        .unwrap_err();

    match err {
        TelegramError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, Some(3)),
        other => panic!("Expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport = MockTransport::new().respond_with(ScriptedResponse::fail("connection reset"));
    let mut client = client_with(&transport);

    let err = client
        .send_request(&Request::new("t", "getMe"))
        .await
        .unwrap_err();

    assert!(matches!(err, TelegramError::Io(_)));
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_no_retry_after_failure() {
    let transport = MockTransport::new()
        .respond_with(ScriptedResponse::api_error(500, "Internal Server Error"));
    let mut client = client_with(&transport);

    let _ = client.send_request(&Request::new("t", "getMe")).await;

    assert_eq!(transport.call_count(), 1);
}

// =============================================================================
// Async requests
// =============================================================================

#[tokio::test]
async fn test_async_request_returns_pending() {
    let transport = MockTransport::new().respond_with(ScriptedResponse::ok(json!("queued")));
    let mut client = client_with(&transport);

    let response = client
        .send_request(&Request::new("t", "getMe").with_async(true))
        .await
        .unwrap();

    assert!(response.is_pending());
    assert!(!response.is_error());
    assert!(transport.last_call().unwrap().is_async);

    let resolved = response.resolve().await.unwrap();
    assert_eq!(resolved.result(), Some(&json!("queued")));
}

#[tokio::test]
async fn test_async_api_error_surfaces_on_resolve() {
    let transport = MockTransport::new().respond_with(ScriptedResponse::api_error(403, "Forbidden"));
    let mut client = client_with(&transport);

    let response = client
        .send_request(&Request::new("t", "sendMessage").with_async(true))
        .await
        .unwrap();

    let err = response.resolve().await.unwrap_err();
    assert_eq!(err.code(), Some(403));
}

// =============================================================================
// Transport replacement
// =============================================================================

#[tokio::test]
async fn test_set_transport_routes_later_calls() {
    let first = MockTransport::new();
    let second = MockTransport::new();
    let mut client = client_with(&first);

    client.send_request(&Request::new("t", "getMe")).await.unwrap();
    client.set_transport(Box::new(second.clone()));
    client.send_request(&Request::new("t", "getMe")).await.unwrap();

    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);
}

#[tokio::test]
async fn test_new_accepts_injected_transport() {
    let transport = MockTransport::new();
    let mut client = TelegramClient::new(Some(Box::new(transport.clone()))).unwrap();

    client.send_request(&Request::new("t", "getMe")).await.unwrap();

    assert_eq!(transport.call_count(), 1);
}
