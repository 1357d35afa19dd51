// Integration tests for `RtdbClient` using wiremock.

use futures_util::StreamExt;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use robopanel_api::{Error, KeyPathStore, RtdbClient, StoreConfig, StoreEvent};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RtdbClient) {
    let server = MockServer::start().await;
    let config = StoreConfig::new(server.uri().parse().expect("mock server uri"));
    let client = RtdbClient::new(config).expect("client build");
    (server, client)
}

// ── Write path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_put_overwrites_channel_value() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/iot_commands.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"displayText": "HELLO"})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .put("iot_commands", json!({"displayText": "HELLO"}))
        .await
        .expect("put should succeed");
}

#[tokio::test]
async fn test_put_applies_auth_token() {
    let server = MockServer::start().await;
    let config = StoreConfig::new(server.uri().parse().expect("mock server uri"))
        .with_auth_token(secrecy::SecretString::from("tok-123".to_string()));
    let client = RtdbClient::new(config).expect("client build");

    Mock::given(method("PUT"))
        .and(path("/emergency_commands.json"))
        .and(query_param("auth", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .put("emergency_commands", json!({"action": "activate"}))
        .await
        .expect("authorized put should succeed");
}

#[tokio::test]
async fn test_put_permission_denied_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/device_status.json"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": "Permission denied"})),
        )
        .mount(&server)
        .await;

    let err = client
        .put("device_status", json!({"isOnline": true}))
        .await
        .expect_err("403 must fail");
    assert!(err.is_permission());
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn test_put_server_error_is_unavailable() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/iot_commands.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client
        .put("iot_commands", json!({}))
        .await
        .expect_err("503 must fail");
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_delete_removes_alert_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/warning_alerts/w1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    client
        .delete("warning_alerts/w1")
        .await
        .expect("delete should succeed");
}

// ── Read path ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_returns_channel_value() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device_status.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"isOnline": true, "waterLevel": 12})),
        )
        .mount(&server)
        .await;

    let value = client.get("device_status").await.expect("get");
    assert_eq!(value["waterLevel"], 12);
}

#[tokio::test]
async fn test_get_absent_path_reads_null() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/warning_alerts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;

    let value = client.get("warning_alerts").await.expect("get");
    assert!(value.is_null());
}

// ── Subscription path ───────────────────────────────────────────────

#[tokio::test]
async fn test_watch_replays_then_applies_frames_then_terminates() {
    let (server, client) = setup().await;

    // Initial replay `put`, one `patch`, then the connection ends (EOF).
    let body = concat!(
        "event: put\n",
        "data: {\"path\":\"/\",\"data\":{\"isOnline\":true,\"waterLevel\":10}}\n",
        "\n",
        "event: keep-alive\n",
        "data: null\n",
        "\n",
        "event: patch\n",
        "data: {\"path\":\"/\",\"data\":{\"waterLevel\":900}}\n",
        "\n",
    );

    Mock::given(method("GET"))
        .and(path("/device_status.json"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut stream = client.watch("device_status");

    match stream.next().await.expect("replay event") {
        StoreEvent::Value(v) => assert_eq!(v, json!({"isOnline": true, "waterLevel": 10})),
        StoreEvent::Error(e) => panic!("unexpected error: {e}"),
    }

    match stream.next().await.expect("patched event") {
        StoreEvent::Value(v) => assert_eq!(v, json!({"isOnline": true, "waterLevel": 900})),
        StoreEvent::Error(e) => panic!("unexpected error: {e}"),
    }

    // EOF is a transport failure: one error event, then exhaustion.
    match stream.next().await.expect("terminal event") {
        StoreEvent::Error(Error::StreamClosed { .. }) => {}
        other => panic!("expected StreamClosed, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_watch_rejected_attach_yields_single_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/emergency_commands.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut stream = client.watch("emergency_commands");

    match stream.next().await.expect("terminal event") {
        StoreEvent::Error(e) => assert!(e.is_permission()),
        StoreEvent::Value(v) => panic!("expected error, got {v}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_watch_auth_revoked_frame_terminates() {
    let (server, client) = setup().await;

    let body = concat!(
        "event: put\n",
        "data: {\"path\":\"/\",\"data\":null}\n",
        "\n",
        "event: auth_revoked\n",
        "data: credential is no longer valid\n",
        "\n",
    );

    Mock::given(method("GET"))
        .and(path("/warning_alerts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut stream = client.watch("warning_alerts");

    assert!(matches!(
        stream.next().await.expect("replay event"),
        StoreEvent::Value(Value::Null)
    ));
    match stream.next().await.expect("terminal event") {
        StoreEvent::Error(e) => assert!(e.is_permission()),
        StoreEvent::Value(v) => panic!("expected error, got {v}"),
    }
    assert!(stream.next().await.is_none());
}
