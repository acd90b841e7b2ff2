// crates/bitkub-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: MCP server implementations for stdio, HTTP, and SSE transports.
// Purpose: Expose Bitkub gateway tools via JSON-RPC 2.0.
// Dependencies: bitkub-client, axum, tokio
// ============================================================================

//! ## Overview
//! The MCP server exposes the Bitkub tools, two guidance prompts, and the
//! `server-info` resource using JSON-RPC 2.0. It supports stdio, HTTP, and
//! SSE transports and always routes tool calls through
//! [`crate::tools::ToolRouter`]. Exchange failures are returned as in-band
//! tool results with `isError` set, so agent loops can read the embedded
//! error code and explanation; only protocol-level failures use the JSON-RPC
//! error envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::routing::post;
use bitkub_client::ApiCredentials;
use bitkub_client::BitkubClient;
use bitkub_contract::SERVER_INFO_URI;
use bitkub_contract::ToolDefinition;
use bitkub_contract::find_prompt;
use bitkub_contract::prompt_definitions;
use bitkub_contract::resource_definitions;
use bitkub_contract::server_info_payload;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;

use crate::audit::build_audit_sink;
use crate::config::BitkubMcpConfig;
use crate::config::ServerTransport;
use crate::tools::CallContext;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP protocol revision advertised in the initialize response.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: BitkubMcpConfig,
    /// Tool router for request dispatch.
    router: Arc<ToolRouter>,
    /// Whether a complete credential pair was found at startup.
    credentials_configured: bool,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// Credentials are read from `BITKUB_API_KEY` and `BITKUB_SECRET_KEY`;
    /// when either is absent the server still starts and serves the public
    /// market data tools, while signed tools fail with a credential error.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: BitkubMcpConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let credentials =
            ApiCredentials::from_env().unwrap_or_else(|_| ApiCredentials::new("", ""));
        let credentials_configured = credentials.is_complete();
        let client = BitkubClient::new(config.api.client_config(), credentials)
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let audit =
            build_audit_sink(&config.audit).map_err(|err| McpServerError::Init(err.to_string()))?;
        let router = Arc::new(ToolRouter::new(Arc::new(client), audit));
        Ok(Self {
            config,
            router,
            credentials_configured,
        })
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        emit_startup_notice(self.config.server.transport, self.credentials_configured);
        let transport = self.config.server.transport;
        let max_body_bytes = self.config.server.max_body_bytes;
        match transport {
            ServerTransport::Stdio => serve_stdio(&self.router, max_body_bytes),
            ServerTransport::Http => serve_http(self.config, self.router).await,
            ServerTransport::Sse => serve_sse(self.config, self.router).await,
        }
    }
}

/// Writes the startup notice to stderr without echoing any credential.
fn emit_startup_notice(transport: ServerTransport, credentials_configured: bool) {
    let key_state = if credentials_configured {
        "configured"
    } else {
        "not configured (market data only)"
    };
    let _ = writeln!(
        std::io::stderr(),
        "bitkub-mcp: serving {} transport; api key {key_state}",
        transport.label()
    );
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout.
fn serve_stdio(router: &ToolRouter, max_body_bytes: usize) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(std::io::stdin());
    let mut writer = std::io::stdout();
    loop {
        let Some(bytes) = read_framed(&mut reader, max_body_bytes)? else {
            // Stdin closed; the client is gone.
            return Ok(());
        };
        let request: JsonRpcRequest = serde_json::from_slice(&bytes)
            .map_err(|_| McpServerError::Transport("invalid json-rpc request".to_string()))?;
        if request.id.is_none() {
            // Notifications carry no id and receive no reply.
            continue;
        }
        let context = CallContext::stdio();
        let response = handle_request(router, &context, request);
        let payload = serde_json::to_vec(&response.1)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        write_framed(&mut writer, &payload)?;
    }
}

// ============================================================================
// SECTION: HTTP and SSE Transports
// ============================================================================

/// Serves JSON-RPC requests over HTTP.
async fn serve_http(
    config: BitkubMcpConfig,
    router: Arc<ToolRouter>,
) -> Result<(), McpServerError> {
    let addr = bind_addr(&config)?;
    let state = Arc::new(ServerState {
        router,
        transport: ServerTransport::Http,
        max_body_bytes: config.server.max_body_bytes,
    });
    let app = Router::new().route("/rpc", post(handle_http)).with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Serves JSON-RPC requests over SSE.
async fn serve_sse(
    config: BitkubMcpConfig,
    router: Arc<ToolRouter>,
) -> Result<(), McpServerError> {
    let addr = bind_addr(&config)?;
    let state = Arc::new(ServerState {
        router,
        transport: ServerTransport::Sse,
        max_body_bytes: config.server.max_body_bytes,
    });
    let app = Router::new().route("/rpc", post(handle_sse)).with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("sse bind failed".to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|_| McpServerError::Transport("sse server failed".to_string()))
}

/// Resolves the configured bind address.
fn bind_addr(config: &BitkubMcpConfig) -> Result<SocketAddr, McpServerError> {
    let bind = config
        .server
        .bind
        .as_ref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))
}

/// Shared server state for HTTP/SSE handlers.
struct ServerState {
    /// Tool router for request dispatch.
    router: Arc<ToolRouter>,
    /// Transport label for audit events.
    transport: ServerTransport,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(State(state): State<Arc<ServerState>>, bytes: Bytes) -> impl IntoResponse {
    let response = parse_request(&state, &bytes);
    (response.0, axum::Json(response.1))
}

/// Handles SSE JSON-RPC requests.
///
/// The JSON-RPC status is propagated on the HTTP response so transport-level
/// rejections (oversized bodies, malformed requests) are visible without
/// parsing the event payload.
async fn handle_sse(State(state): State<Arc<ServerState>>, bytes: Bytes) -> impl IntoResponse {
    let (status, response) = parse_request(&state, &bytes);
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(1);
    let payload = serde_json::to_string(&response).unwrap_or_else(|_| {
        "{\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32060,\"message\":\"serialization \
         failed\"}}"
            .to_string()
    });
    let _ = tx.send(Ok(Event::default().data(payload))).await;
    (status, Sse::new(ReceiverStream::new(rx)))
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier; absent for notifications.
    #[serde(default)]
    id: Option<Value>,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Prompt lookup parameters for `prompts/get`.
#[derive(Debug, Deserialize)]
struct PromptGetParams {
    /// Prompt name.
    name: String,
}

/// Resource lookup parameters for `resources/read`.
#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    /// Resource URI.
    uri: String,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
    /// True when the payload describes a tool-level failure.
    #[serde(rename = "isError")]
    is_error: bool,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Plain text tool output.
    Text {
        /// Rendered payload text.
        text: String,
    },
}

/// Builds a success response envelope.
fn jsonrpc_result(id: Value, result: Value) -> (StatusCode, JsonRpcResponse) {
    (
        StatusCode::OK,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        },
    )
}

/// Builds a plain protocol error response.
fn jsonrpc_failure(id: Value, code: i64, message: String) -> (StatusCode, JsonRpcResponse) {
    let status = if code == -32601 || code == -32602 || code == -32600 {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (
        status,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
            }),
        },
    )
}

/// Dispatches a JSON-RPC request to the tool router.
fn handle_request(
    router: &ToolRouter,
    base_context: &CallContext,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    let id = request.id.unwrap_or(Value::Null);
    if request.jsonrpc != "2.0" {
        return jsonrpc_failure(id, -32600, "invalid json-rpc version".to_string());
    }
    let context = base_context.clone().with_request_id(id.to_string());
    match request.method.as_str() {
        "initialize" => jsonrpc_result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {}, "prompts": {}, "resources": {} },
                "serverInfo": {
                    "name": "bitkub-mcp",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "prompts/list" => jsonrpc_result(
            id,
            json!({
                "prompts": prompt_definitions()
                    .iter()
                    .map(|prompt| json!({
                        "name": prompt.name,
                        "description": prompt.description,
                    }))
                    .collect::<Vec<_>>(),
            }),
        ),
        "prompts/get" => {
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<PromptGetParams>(params) {
                Ok(params) => prompt_get(id, &params.name),
                Err(_) => jsonrpc_failure(id, -32602, "invalid prompt params".to_string()),
            }
        }
        "resources/list" => jsonrpc_result(
            id,
            json!({
                "resources": resource_definitions()
                    .iter()
                    .map(|resource| json!({
                        "uri": resource.uri,
                        "name": resource.name,
                        "description": resource.description,
                        "mimeType": resource.mime_type,
                    }))
                    .collect::<Vec<_>>(),
            }),
        ),
        "resources/read" => {
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<ResourceReadParams>(params) {
                Ok(params) => resource_read(router, id, &params.uri),
                Err(_) => jsonrpc_failure(id, -32602, "invalid resource params".to_string()),
            }
        }
        "tools/list" => {
            let tools = router.list_tools();
            match serde_json::to_value(ToolListResult {
                tools,
            }) {
                Ok(value) => jsonrpc_result(id, value),
                Err(_) => jsonrpc_error(id, &ToolError::Serialization),
            }
        }
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let call = serde_json::from_value::<ToolCallParams>(params);
            match call {
                Ok(call) => {
                    match call_tool_with_blocking(router, context, &call.name, call.arguments) {
                        Ok(result) => tool_call_success(id, &result),
                        Err(ToolError::Api(err)) => tool_call_failure(id, &err.to_string()),
                        Err(err) => jsonrpc_error(id, &err),
                    }
                }
                Err(_) => jsonrpc_failure(id, -32602, "invalid tool params".to_string()),
            }
        }
        _ => jsonrpc_failure(id, -32601, "method not found".to_string()),
    }
}

/// Serves one prompt as a single user message.
fn prompt_get(id: Value, name: &str) -> (StatusCode, JsonRpcResponse) {
    match find_prompt(name) {
        Some(prompt) => jsonrpc_result(
            id,
            json!({
                "description": prompt.description,
                "messages": [{
                    "role": "user",
                    "content": { "type": "text", "text": prompt.text },
                }],
            }),
        ),
        None => jsonrpc_failure(id, -32602, format!("unknown prompt: {name}")),
    }
}

/// Serves one resource read; only the server-info resource exists.
fn resource_read(router: &ToolRouter, id: Value, uri: &str) -> (StatusCode, JsonRpcResponse) {
    if uri != SERVER_INFO_URI {
        return jsonrpc_failure(id, -32602, format!("unknown resource: {uri}"));
    }
    let payload = server_info_payload(
        env!("CARGO_PKG_VERSION"),
        router.credentials_configured(),
        router.base_url(),
    );
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    jsonrpc_result(
        id,
        json!({
            "contents": [{
                "uri": SERVER_INFO_URI,
                "mimeType": "application/json",
                "text": text,
            }],
        }),
    )
}

/// Renders a successful tool result as pretty-printed text content.
fn tool_call_success(id: Value, result: &Value) -> (StatusCode, JsonRpcResponse) {
    let text = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    let payload = ToolCallResult {
        content: vec![ToolContent::Text {
            text,
        }],
        is_error: false,
    };
    match serde_json::to_value(payload) {
        Ok(value) => jsonrpc_result(id, value),
        Err(_) => jsonrpc_error(id, &ToolError::Serialization),
    }
}

/// Renders an exchange failure as an in-band tool error result.
///
/// The message already embeds the numeric code and its explanation; keeping
/// it in-band lets agent loops read and react to it instead of aborting on a
/// protocol error.
fn tool_call_failure(id: Value, message: &str) -> (StatusCode, JsonRpcResponse) {
    let payload = ToolCallResult {
        content: vec![ToolContent::Text {
            text: format!("Error: {message}"),
        }],
        is_error: true,
    };
    match serde_json::to_value(payload) {
        Ok(value) => jsonrpc_result(id, value),
        Err(_) => jsonrpc_error(id, &ToolError::Serialization),
    }
}

/// Executes a tool call, shifting to a blocking context when available.
fn call_tool_with_blocking(
    router: &ToolRouter,
    context: CallContext,
    name: &str,
    arguments: Value,
) -> Result<Value, ToolError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| router.handle_tool_call(&context, name, arguments))
        }
        _ => router.handle_tool_call(&context, name, arguments),
    }
}

/// Parses and validates a JSON-RPC request payload.
fn parse_request(state: &ServerState, bytes: &Bytes) -> (StatusCode, JsonRpcResponse) {
    if bytes.len() > state.max_body_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: Value::Null,
                result: None,
                error: Some(JsonRpcError {
                    code: -32070,
                    message: "request body too large".to_string(),
                }),
            },
        );
    }
    let context = CallContext {
        transport: state.transport,
        request_id: None,
    };
    let request: Result<JsonRpcRequest, _> = serde_json::from_slice(bytes.as_ref());
    request.map_or_else(
        |_| jsonrpc_failure(Value::Null, -32600, "invalid json-rpc request".to_string()),
        |request| handle_request(&state.router, &context, request),
    )
}

/// Builds a JSON-RPC error response for a protocol-level tool failure.
fn jsonrpc_error(id: Value, error: &ToolError) -> (StatusCode, JsonRpcResponse) {
    let (code, message) = match error {
        ToolError::UnknownTool => (-32601, "unknown tool".to_string()),
        ToolError::InvalidParams(message) => (-32602, message.clone()),
        ToolError::Api(err) => (-32050, err.to_string()),
        ToolError::Serialization => (-32060, "serialization failed".to_string()),
    };
    jsonrpc_failure(id, code, message)
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Reads a framed stdio payload using MCP Content-Length headers.
///
/// Returns `Ok(None)` when stdin closes before a new frame starts.
fn read_framed(
    reader: &mut BufReader<impl Read>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if content_length.is_none() {
                return Ok(None);
            }
            return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using MCP Content-Length headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
