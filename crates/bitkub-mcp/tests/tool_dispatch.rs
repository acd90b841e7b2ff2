// crates/bitkub-mcp/tests/tool_dispatch.rs
// ============================================================================
// Module: Tool Dispatch Tests
// Description: End-to-end router tests against a local fake exchange.
// Purpose: Verify tool-to-endpoint wiring, argument stripping, and auditing.
// Dependencies: bitkub-client, bitkub-mcp, tiny_http
// ============================================================================

//! ## Overview
//! These tests run the tool router against a local HTTP server that records
//! every request, verifying that each tool reaches its exchange endpoint with
//! the expected method, query, body, and headers.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;

use bitkub_client::ApiCredentials;
use bitkub_client::BitkubClient;
use bitkub_client::BitkubClientConfig;
use bitkub_mcp::McpAuditSink;
use bitkub_mcp::NoopAuditSink;
use bitkub_mcp::ToolCallAuditEvent;
use bitkub_mcp::ToolError;
use bitkub_mcp::ToolRouter;
use bitkub_mcp::tools::CallContext;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fake Exchange
// ============================================================================

/// Fixed credentials for signed-call tests.
const API_KEY: &str = "test-api-key";
/// Fixed secret for signed-call tests.
const SECRET: &str = "test-secret";

/// One request captured by the fake exchange.
struct RecordedRequest {
    /// HTTP method.
    method: String,
    /// Request URL including query string.
    url: String,
    /// Request headers as name/value pairs.
    headers: Vec<(String, String)>,
    /// Raw request body.
    body: String,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Local HTTP server that records requests and serves canned responses.
struct FakeExchange {
    /// Base URL of the listening server.
    base_url: String,
    /// Requests recorded so far.
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Server thread handle.
    handle: JoinHandle<()>,
}

impl FakeExchange {
    /// Starts a server that answers `expected_requests` requests.
    ///
    /// The `/api/v3/servertime` endpoint returns a monotonically increasing
    /// timestamp; every other request receives the canned body.
    fn spawn(body: Value, expected_requests: usize) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind test server");
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{addr}");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let clock = AtomicI64::new(1_700_000_000_000);
        let canned = body.to_string();
        let handle = std::thread::spawn(move || {
            for _ in 0..expected_requests {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(5)) else {
                    return;
                };
                let mut body = String::new();
                let _ = std::io::Read::read_to_string(request.as_reader(), &mut body);
                let record = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| {
                            (header.field.to_string(), header.value.as_str().to_string())
                        })
                        .collect(),
                    body,
                };
                let is_servertime = record.url == "/api/v3/servertime";
                recorded.lock().unwrap().push(record);
                let payload = if is_servertime {
                    let timestamp = clock.fetch_add(1, Ordering::SeqCst);
                    format!("{{\"error\":0,\"result\":{timestamp}}}")
                } else {
                    canned.clone()
                };
                let header =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(payload).with_header(header);
                let _ = request.respond(response);
            }
        });
        Self {
            base_url,
            requests,
            handle,
        }
    }

    /// Builds a router whose client targets this server.
    fn router(&self, credentials: ApiCredentials, audit: Arc<dyn McpAuditSink>) -> ToolRouter {
        let config = BitkubClientConfig {
            base_url: self.base_url.clone(),
            timeout_ms: 5_000,
            ..BitkubClientConfig::default()
        };
        let client = BitkubClient::new(config, credentials).expect("client");
        ToolRouter::new(Arc::new(client), audit)
    }

    /// Waits for the server thread and returns the recorded requests.
    fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().expect("server thread");
        Arc::try_unwrap(self.requests).map_or_else(
            |shared| shared.lock().unwrap().drain(..).collect(),
            |requests| requests.into_inner().unwrap(),
        )
    }
}

/// Audit sink that captures events for assertions.
#[derive(Default)]
struct CaptureAuditSink {
    /// Captured events.
    events: Mutex<Vec<ToolCallAuditEvent>>,
}

impl McpAuditSink for CaptureAuditSink {
    fn record(&self, event: &ToolCallAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Public Tool Wiring
// ============================================================================

#[test]
fn market_tools_hit_their_endpoints_without_auth_headers() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": [] }), 1);
    let router = exchange.router(ApiCredentials::new("", ""), Arc::new(NoopAuditSink));
    let result = router
        .handle_tool_call(&CallContext::stdio(), "btk_ticker", json!({ "sym": "THB_BTC" }))
        .expect("ticker call");
    assert_eq!(result["error"], 0);
    let requests = exchange.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/api/v3/market/ticker?sym=THB_BTC");
    assert!(requests[0].header("X-BTK-APIKEY").is_none());
    assert!(requests[0].header("X-BTK-SIGN").is_none());
}

#[test]
fn fields_argument_never_reaches_the_exchange_query() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": [] }), 1);
    let router = exchange.router(ApiCredentials::new("", ""), Arc::new(NoopAuditSink));
    router
        .handle_tool_call(
            &CallContext::stdio(),
            "btk_ticker",
            json!({ "sym": "THB_BTC", "_fields": "last,high_24_hr" }),
        )
        .expect("ticker call");
    let requests = exchange.finish();
    assert_eq!(requests[0].url, "/api/v3/market/ticker?sym=THB_BTC");
}

#[test]
fn fixed_argument_tools_ignore_caller_arguments() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": {} }), 1);
    let router = exchange.router(ApiCredentials::new("", ""), Arc::new(NoopAuditSink));
    router
        .handle_tool_call(&CallContext::stdio(), "btk_symbols", json!({ "sym": "ignored" }))
        .expect("symbols call");
    let requests = exchange.finish();
    assert_eq!(requests[0].url, "/api/v3/market/symbols");
}

// ============================================================================
// SECTION: Signed Tool Wiring
// ============================================================================

#[test]
fn balances_posts_an_empty_signed_body() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": {} }), 2);
    let router =
        exchange.router(ApiCredentials::new(API_KEY, SECRET), Arc::new(NoopAuditSink));
    router
        .handle_tool_call(&CallContext::stdio(), "btk_balances", Value::Null)
        .expect("balances call");
    let requests = exchange.finish();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, "/api/v3/servertime");
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].url, "/api/v3/market/balances");
    assert_eq!(requests[1].body, "");
    assert_eq!(requests[1].header("X-BTK-APIKEY"), Some(API_KEY));
    assert!(requests[1].header("X-BTK-SIGN").is_some());
    assert!(requests[1].header("X-BTK-TIMESTAMP").is_some());
}

#[test]
fn place_bid_forwards_order_parameters_minus_reserved_keys() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": { "id": "1" } }), 2);
    let router =
        exchange.router(ApiCredentials::new(API_KEY, SECRET), Arc::new(NoopAuditSink));
    router
        .handle_tool_call(
            &CallContext::stdio(),
            "btk_place_bid",
            json!({
                "sym": "btc_thb",
                "amt": 1000,
                "rat": 2400000,
                "typ": "limit",
                "_fields": "id,hash",
                "BITKUB_API_KEY": "should-never-appear"
            }),
        )
        .expect("place bid");
    let requests = exchange.finish();
    assert_eq!(requests[1].url, "/api/v3/market/place-bid");
    let body: Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(
        body,
        json!({ "sym": "btc_thb", "amt": 1000, "rat": 2400000, "typ": "limit" })
    );
}

#[test]
fn wallet_uses_a_signed_get_without_query() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": {} }), 2);
    let router =
        exchange.router(ApiCredentials::new(API_KEY, SECRET), Arc::new(NoopAuditSink));
    router
        .handle_tool_call(&CallContext::stdio(), "btk_wallet", json!({}))
        .expect("wallet call");
    let requests = exchange.finish();
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].url, "/api/v3/market/wallet");
}

#[test]
fn crypto_tools_target_the_v4_endpoints() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": [] }), 2);
    let router =
        exchange.router(ApiCredentials::new(API_KEY, SECRET), Arc::new(NoopAuditSink));
    router
        .handle_tool_call(&CallContext::stdio(), "btk_crypto_addresses", json!({ "p": 1 }))
        .expect("addresses call");
    let requests = exchange.finish();
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].url, "/api/v4/crypto/addresses");
    let body: Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body, json!({ "p": 1 }));
}

// ============================================================================
// SECTION: Failure Paths and Auditing
// ============================================================================

#[test]
fn unknown_tools_fail_without_any_network_traffic() {
    let config = BitkubClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_ms: 1_000,
        ..BitkubClientConfig::default()
    };
    let client = BitkubClient::new(config, ApiCredentials::new("", "")).unwrap();
    let router = ToolRouter::new(Arc::new(client), Arc::new(NoopAuditSink));
    let err = router
        .handle_tool_call(&CallContext::stdio(), "btk_not_a_tool", json!({}))
        .unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool));
}

#[test]
fn missing_credentials_fail_signed_tools_before_the_network() {
    let config = BitkubClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_ms: 1_000,
        ..BitkubClientConfig::default()
    };
    let client = BitkubClient::new(config, ApiCredentials::new("", "")).unwrap();
    let audit = Arc::new(CaptureAuditSink::default());
    let router = ToolRouter::new(Arc::new(client), Arc::clone(&audit) as Arc<dyn McpAuditSink>);
    let err = router
        .handle_tool_call(&CallContext::stdio(), "btk_wallet", json!({}))
        .unwrap_err();
    assert!(err.to_string().contains("BITKUB_API_KEY"));
    let events = audit.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, "error");
    assert_eq!(events[0].error_kind, Some("missing_credentials"));
}

#[test]
fn successful_calls_produce_one_ok_audit_event() {
    let exchange = FakeExchange::spawn(json!({ "error": 0, "result": [] }), 1);
    let audit = Arc::new(CaptureAuditSink::default());
    let router =
        exchange.router(ApiCredentials::new("", ""), Arc::clone(&audit) as Arc<dyn McpAuditSink>);
    router
        .handle_tool_call(&CallContext::stdio(), "btk_server_time", Value::Null)
        .expect("server time");
    exchange.finish();
    let events = audit.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, "ok");
    assert_eq!(events[0].error_kind, None);
    assert_eq!(events[0].tool.map(|tool| tool.as_str()), Some("btk_server_time"));
}

#[test]
fn nonzero_envelope_codes_surface_with_their_explanation() {
    let exchange = FakeExchange::spawn(json!({ "error": 18 }), 2);
    let router =
        exchange.router(ApiCredentials::new(API_KEY, SECRET), Arc::new(NoopAuditSink));
    let err = router
        .handle_tool_call(
            &CallContext::stdio(),
            "btk_place_bid",
            json!({ "sym": "btc_thb", "amt": 10, "rat": 1, "typ": "limit" }),
        )
        .unwrap_err();
    exchange.finish();
    let message = err.to_string();
    assert!(message.contains("18"));
    assert!(message.contains("Insufficient balance"));
}
