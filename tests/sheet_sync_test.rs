//! Delivery tests for the Google Sheets sync worker, pointed at a mock
//! Apps Script endpoint.

use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use global_marketplace::sync::{spawn, LogLevel, SheetClient, SyncHandle};

async fn worker(server: &MockServer) -> SyncHandle {
    spawn(SheetClient::new(
        Some(format!("{}/exec", server.uri())),
        "Global Marketplace",
        "1.0.0",
    ))
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(server)
        .await;
}

fn body_of(request: &wiremock::Request) -> Value {
    serde_json::from_slice(&request.body).expect("json body")
}

#[tokio::test]
async fn test_log_delivery_is_addressed_and_stamped() {
    let server = MockServer::start().await;
    mount_ok(&server).await;
    let sync = worker(&server).await;

    sync.log(
        LogLevel::Info,
        "User logged in: mei@example.com",
        "mei@example.com",
        "login",
    );
    sync.flush().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/exec");
    assert_eq!(requests[0].url.query(), Some("action=log"));

    let body = body_of(&requests[0]);
    assert_eq!(body["action"], "log");
    assert_eq!(body["level"], "INFO");
    assert_eq!(body["message"], "User logged in: mei@example.com");
    assert_eq!(body["user"], "mei@example.com");
    assert_eq!(body["page"], "login");
    assert_eq!(body["app"], "Global Marketplace");
    assert_eq!(body["version"], "1.0.0");
    let stamp = body["timestamp"].as_str().expect("timestamp string");
    chrono::DateTime::parse_from_rfc3339(stamp).expect("rfc3339 timestamp");
}

#[tokio::test]
async fn test_record_delivery_carries_action_table_data() {
    let server = MockServer::start().await;
    mount_ok(&server).await;
    let sync = worker(&server).await;

    sync.record(
        "createOrder",
        "Orders",
        json!({ "orderNumber": "ORD-00000042", "total": "634.94" }),
    );
    sync.flush().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/exec");
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(
        body_of(&requests[0]),
        json!({
            "action": "createOrder",
            "table": "Orders",
            "data": { "orderNumber": "ORD-00000042", "total": "634.94" },
        })
    );
}

#[tokio::test]
async fn test_server_errors_are_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let sync = worker(&server).await;

    sync.log(LogLevel::Error, "boom", "anonymous", "/checkout");
    sync.flush().await;
    sync.record("saveCart", "Cart", json!({"sessionId": "s-1"}));
    sync.flush().await;

    // both deliveries were attempted despite the 500s
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_flush_waits_for_pending_deliveries() {
    let server = MockServer::start().await;
    mount_ok(&server).await;
    let sync = worker(&server).await;

    for seq in 0..5 {
        sync.record("auditRow", "SystemLogs", json!({ "seq": seq }));
    }
    sync.flush().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
    for (seq, request) in requests.iter().enumerate() {
        assert_eq!(body_of(request)["data"]["seq"], seq as i64);
    }
}
