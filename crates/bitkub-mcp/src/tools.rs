// crates/bitkub-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool routing for the Bitkub MCP server.
// Purpose: Map the 28 gateway tools onto signing client calls.
// Dependencies: bitkub-client, bitkub-contract
// ============================================================================

//! ## Overview
//! The tool router dispatches MCP tool calls to the signing REST client. The
//! dispatch table is a single exhaustive match over [`ToolName`], so adding a
//! tool without wiring its endpoint fails to compile. Before dispatch the
//! router strips the reserved `_fields` argument (a client-side response
//! filter) and any credential-shaped arguments; neither must ever reach the
//! exchange as a request parameter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use bitkub_client::BitkubClient;
use bitkub_client::BitkubError;
use bitkub_contract::ToolDefinition;
use bitkub_contract::ToolName;
use bitkub_contract::tool_definitions;
use serde_json::Value;
use thiserror::Error;

use crate::audit::McpAuditSink;
use crate::audit::ToolCallAuditEvent;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Reserved Arguments
// ============================================================================

/// Arguments removed from every tool call before dispatch.
///
/// `_fields` is a response filter for MCP clients, not an exchange
/// parameter. The credential names are stripped so a confused client that
/// passes keys as tool arguments can never forward them to the exchange.
const RESERVED_ARGS: &[&str] = &["_fields", "BITKUB_API_KEY", "BITKUB_SECRET_KEY"];

// ============================================================================
// SECTION: Call Context
// ============================================================================

/// Transport-level context for one tool call, used for audit events.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Transport the call arrived on.
    pub transport: ServerTransport,
    /// JSON-RPC request identifier when provided.
    pub request_id: Option<String>,
}

impl CallContext {
    /// Context for stdio transport requests.
    #[must_use]
    pub const fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            request_id: None,
        }
    }

    /// Returns a copy carrying the given request identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Routes MCP tool calls to the signing client.
pub struct ToolRouter {
    /// Shared exchange client.
    client: Arc<BitkubClient>,
    /// Audit sink for tool call events.
    audit: Arc<dyn McpAuditSink>,
}

impl ToolRouter {
    /// Creates a new tool router.
    #[must_use]
    pub fn new(client: Arc<BitkubClient>, audit: Arc<dyn McpAuditSink>) -> Self {
        Self {
            client,
            audit,
        }
    }

    /// Lists the MCP tools supported by this server.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Returns true when the client holds a complete credential pair.
    #[must_use]
    pub fn credentials_configured(&self) -> bool {
        self.client.has_credentials()
    }

    /// Returns the exchange base URL the client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Handles a tool call by name with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool is unknown, the arguments are not
    /// an object, or the exchange call fails.
    pub fn handle_tool_call(
        &self,
        context: &CallContext,
        name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let started = Instant::now();
        let tool = ToolName::parse(name);
        let result = match tool {
            Some(tool) => self.dispatch(tool, arguments),
            None => Err(ToolError::UnknownTool),
        };
        let duration_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.audit.record(&ToolCallAuditEvent {
            event: "tool_call",
            timestamp_ms: ToolCallAuditEvent::now_ms(),
            transport: context.transport,
            request_id: context.request_id.clone(),
            tool,
            outcome: if result.is_ok() { "ok" } else { "error" },
            error_kind: result.as_ref().err().map(ToolError::kind),
            duration_ms,
        });
        result
    }

    /// Dispatches one parsed tool to its exchange endpoint.
    fn dispatch(&self, tool: ToolName, arguments: Value) -> Result<Value, ToolError> {
        let params = strip_reserved_args(arguments)?;
        let result = match tool {
            ToolName::ServerTime => self.client.public_get("/api/v3/servertime", &Value::Null),
            ToolName::ServerStatus => self.client.public_get("/api/status", &Value::Null),
            ToolName::Symbols => self.client.public_get("/api/v3/market/symbols", &Value::Null),
            ToolName::Ticker => self.client.public_get("/api/v3/market/ticker", &params),
            ToolName::RecentTrades => self.client.public_get("/api/v3/market/trades", &params),
            ToolName::Bids => self.client.public_get("/api/v3/market/bids", &params),
            ToolName::Asks => self.client.public_get("/api/v3/market/asks", &params),
            ToolName::Books => self.client.public_get("/api/v3/market/books", &params),
            ToolName::Depth => self.client.public_get("/api/v3/market/depth", &params),
            ToolName::TradingviewHistory => {
                self.client.public_get("/api/tradingview/history", &params)
            }
            ToolName::Wallet => self.client.signed_get("/api/v3/market/wallet", &Value::Null),
            ToolName::Balances => self.client.signed_post("/api/v3/market/balances", &Value::Null),
            ToolName::TradingCredits => {
                self.client.signed_post("/api/v3/market/trading-credits", &Value::Null)
            }
            ToolName::UserLimits => self.client.signed_post("/api/v3/user/limits", &Value::Null),
            ToolName::PlaceBid => self.client.signed_post("/api/v3/market/place-bid", &params),
            ToolName::PlaceAsk => self.client.signed_post("/api/v3/market/place-ask", &params),
            ToolName::PlaceBidTest => {
                self.client.signed_post("/api/v3/market/place-bid/test", &params)
            }
            ToolName::PlaceAskTest => {
                self.client.signed_post("/api/v3/market/place-ask/test", &params)
            }
            ToolName::CancelOrder => {
                self.client.signed_post("/api/v3/market/cancel-order", &params)
            }
            ToolName::MyOpenOrders => {
                self.client.signed_post("/api/v3/market/my-open-orders", &params)
            }
            ToolName::MyOrderHistory => {
                self.client.signed_post("/api/v3/market/my-order-history", &params)
            }
            ToolName::OrderInfo => self.client.signed_post("/api/v3/market/order-info", &params),
            ToolName::CryptoAddresses => {
                self.client.signed_post("/api/v4/crypto/addresses", &params)
            }
            ToolName::CryptoWithdraw => self.client.signed_post("/api/v4/crypto/withdraw", &params),
            ToolName::CryptoInternalWithdraw => {
                self.client.signed_post("/api/v4/crypto/internal-withdraw", &params)
            }
            ToolName::CryptoDepositHistory => {
                self.client.signed_post("/api/v4/crypto/deposit-history", &params)
            }
            ToolName::CryptoWithdrawHistory => {
                self.client.signed_post("/api/v4/crypto/withdraw-history", &params)
            }
            ToolName::CryptoGenerateAddress => {
                self.client.signed_post("/api/v4/crypto/generate-address", &params)
            }
        };
        result.map_err(ToolError::Api)
    }
}

/// Removes reserved arguments from a tool call payload.
///
/// `null` stands in for "no arguments"; anything other than an object is
/// rejected before it can reach the exchange.
fn strip_reserved_args(arguments: Value) -> Result<Value, ToolError> {
    match arguments {
        Value::Null => Ok(Value::Null),
        Value::Object(mut map) => {
            for key in RESERVED_ARGS {
                map.remove(*key);
            }
            Ok(Value::Object(map))
        }
        _ => Err(ToolError::InvalidParams("tool arguments must be an object".to_string())),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool name is not part of the catalogue.
    #[error("unknown tool")]
    UnknownTool,
    /// The tool arguments were malformed.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// The exchange call failed.
    #[error(transparent)]
    Api(#[from] BitkubError),
    /// A response payload could not be serialized.
    #[error("serialization failed")]
    Serialization,
}

impl ToolError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::InvalidParams(_) => "invalid_params",
            Self::Api(BitkubError::MissingCredentials) => "missing_credentials",
            Self::Api(_) => "api",
            Self::Serialization => "serialization",
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only output and panic-based assertions are permitted."
    )]

    use serde_json::Value;
    use serde_json::json;

    use super::ToolError;
    use super::strip_reserved_args;

    #[test]
    fn strip_removes_fields_and_credential_arguments() {
        let stripped = strip_reserved_args(json!({
            "sym": "THB_BTC",
            "_fields": "last,high",
            "BITKUB_API_KEY": "leak",
            "BITKUB_SECRET_KEY": "leak"
        }))
        .unwrap();
        assert_eq!(stripped, json!({ "sym": "THB_BTC" }));
    }

    #[test]
    fn strip_passes_null_through() {
        assert_eq!(strip_reserved_args(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn strip_rejects_non_object_arguments() {
        let err = strip_reserved_args(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
