// crates/bitkub-contract/src/tooling.rs
// ============================================================================
// Module: MCP Tool Contracts
// Description: Canonical MCP tool definitions for the Bitkub gateway.
// Purpose: Drive MCP tool listings with stable names, schemas, and annotations.
// Dependencies: serde_json, bitkub-contract::types
// ============================================================================

//! ## Overview
//! This module defines the canonical MCP tool surface: ten market data tools,
//! four account tools, eight order tools, and six crypto wallet tools. Every
//! read tool accepts the reserved `_fields` argument, a client-side response
//! filter the gateway strips before forwarding arguments to the exchange.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::types::ToolAnnotations;
use crate::types::ToolDefinition;
use crate::types::ToolName;

// ============================================================================
// SECTION: Tool Listing
// ============================================================================

/// Returns the canonical MCP tool definitions.
///
/// The order is intentional and matches [`ToolName::all`]; it is preserved in
/// tool listings to keep client-side diffs stable. Append new tools at the
/// end.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        server_time_definition(),
        server_status_definition(),
        symbols_definition(),
        ticker_definition(),
        recent_trades_definition(),
        bids_definition(),
        asks_definition(),
        books_definition(),
        depth_definition(),
        tradingview_history_definition(),
        wallet_definition(),
        balances_definition(),
        trading_credits_definition(),
        user_limits_definition(),
        place_bid_definition(),
        place_ask_definition(),
        place_bid_test_definition(),
        place_ask_test_definition(),
        cancel_order_definition(),
        my_open_orders_definition(),
        my_order_history_definition(),
        order_info_definition(),
        crypto_addresses_definition(),
        crypto_withdraw_definition(),
        crypto_internal_withdraw_definition(),
        crypto_deposit_history_definition(),
        crypto_withdraw_history_definition(),
        crypto_generate_address_definition(),
    ]
}

// ============================================================================
// SECTION: Annotation Helpers
// ============================================================================

/// Annotations for read-only, idempotent exchange queries.
const fn read_only(title: &'static str) -> ToolAnnotations {
    ToolAnnotations {
        title,
        read_only_hint: true,
        destructive_hint: false,
        idempotent_hint: true,
        open_world_hint: true,
    }
}

/// Annotations for state-changing but recoverable operations.
const fn mutating(title: &'static str) -> ToolAnnotations {
    ToolAnnotations {
        title,
        read_only_hint: false,
        destructive_hint: false,
        idempotent_hint: false,
        open_world_hint: true,
    }
}

/// Annotations for operations that cancel or irreversibly move value.
const fn destructive(title: &'static str) -> ToolAnnotations {
    ToolAnnotations {
        title,
        read_only_hint: false,
        destructive_hint: true,
        idempotent_hint: false,
        open_world_hint: true,
    }
}

// ============================================================================
// SECTION: Schema Helpers
// ============================================================================

/// Schema fragment for the reserved `_fields` response filter argument.
fn fields_property() -> Value {
    json!({
        "type": "string",
        "description": "Comma-separated list of fields to include in response"
    })
}

/// Builds an object input schema without required properties.
fn object_schema(properties: Value) -> Value {
    json!({ "type": "object", "properties": properties })
}

/// Builds an object input schema with required properties.
fn object_schema_required(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

// ============================================================================
// SECTION: Market Data Tools
// ============================================================================

/// Builds the tool definition for `btk_server_time`.
fn server_time_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::ServerTime,
        description: "Get Bitkub server time (millisecond timestamp). Use to check connectivity \
                      and sync timestamps for signed requests."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("Get Server Time"),
    }
}

/// Builds the tool definition for `btk_server_status`.
fn server_status_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::ServerStatus,
        description: "Get Bitkub API server status. Returns status for both non-secure and \
                      secure endpoints."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("Get Server Status"),
    }
}

/// Builds the tool definition for `btk_symbols`.
fn symbols_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Symbols,
        description: "List all trading symbols on Bitkub with details: base/quote asset, price \
                      scale, min order size, status, market segment. The \"source\" field \
                      indicates \"exchange\" (regular) or \"broker\" (broker coins)."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("List All Symbols"),
    }
}

/// Builds the tool definition for `btk_ticker`.
fn ticker_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Ticker,
        description: "Get 24-hour ticker data: last price, bid/ask, percent change, volume, \
                      high/low. Returns all symbols if no sym specified."
            .to_string(),
        input_schema: object_schema(json!({
            "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\"). Omit for all symbols." },
            "_fields": fields_property()
        })),
        annotations: read_only("Get Ticker"),
    }
}

/// Builds the tool definition for `btk_recent_trades`.
fn recent_trades_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::RecentTrades,
        description: "Get recent trades for a symbol. Each trade includes timestamp, price, \
                      amount, and side (BUY/SELL)."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "lmt": { "type": "integer", "description": "Number of trades to return (default: 10, max: 100)" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get Recent Trades"),
    }
}

/// Builds the tool definition for `btk_bids`.
fn bids_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Bids,
        description: "Get buy-side order book (bids) for a symbol. Each entry: [price, volume, \
                      timestamp]."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "lmt": { "type": "integer", "description": "Number of entries (default: 10, max: 100)" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get Bids (Buy Orders)"),
    }
}

/// Builds the tool definition for `btk_asks`.
fn asks_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Asks,
        description: "Get sell-side order book (asks) for a symbol. Each entry: [price, volume, \
                      timestamp]."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "lmt": { "type": "integer", "description": "Number of entries (default: 10, max: 100)" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get Asks (Sell Orders)"),
    }
}

/// Builds the tool definition for `btk_books`.
fn books_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Books,
        description: "Get complete order book (both bids and asks) for a symbol.".to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "lmt": { "type": "integer", "description": "Entries per side (default: 10, max: 100)" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get Order Book (Complete)"),
    }
}

/// Builds the tool definition for `btk_depth`.
fn depth_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Depth,
        description: "Get market depth for a symbol. Similar to order book but without \
                      timestamps; just [price, volume] pairs."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "lmt": { "type": "integer", "description": "Number of levels (default: 10, max: 100)" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get Market Depth"),
    }
}

/// Builds the tool definition for `btk_tradingview_history`.
fn tradingview_history_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::TradingviewHistory,
        description: "Get TradingView-compatible OHLCV candlestick data. Returns arrays of open, \
                      high, low, close, volume for charting."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "symbol": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "resolution": { "type": "string", "description": "Candle interval: 1, 5, 15, 60, 240, or 1D" },
                "from": { "type": "integer", "description": "Start time (UNIX timestamp in seconds)" },
                "to": { "type": "integer", "description": "End time (UNIX timestamp in seconds)" },
                "_fields": fields_property()
            }),
            &["symbol", "resolution", "from", "to"],
        ),
        annotations: read_only("Get TradingView History"),
    }
}

// ============================================================================
// SECTION: Account Tools
// ============================================================================

/// Builds the tool definition for `btk_wallet`.
fn wallet_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Wallet,
        description: "Get available balances for all currencies. Shows only available balance \
                      (not reserved). For full balance info, use btk_balances."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("Get Wallet (Available Balance)"),
    }
}

/// Builds the tool definition for `btk_balances`.
fn balances_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::Balances,
        description: "Get complete balances for all currencies including both available and \
                      reserved amounts."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("Get Balances (Full)"),
    }
}

/// Builds the tool definition for `btk_trading_credits`.
fn trading_credits_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::TradingCredits,
        description: "Get trading credit balance. Trading credits can be used to offset trading \
                      fees."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("Get Trading Credits"),
    }
}

/// Builds the tool definition for `btk_user_limits`.
fn user_limits_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::UserLimits,
        description: "Get user deposit/withdrawal limits and current usage for both crypto and \
                      fiat currencies."
            .to_string(),
        input_schema: object_schema(json!({ "_fields": fields_property() })),
        annotations: read_only("Get User Limits"),
    }
}

// ============================================================================
// SECTION: Order Tools
// ============================================================================

/// Builds the tool definition for `btk_place_bid`.
fn place_bid_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::PlaceBid,
        description: "Place a buy order. For limit orders specify rate. For market orders, rate \
                      is ignored. WARNING: Uses real money."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "amt": { "type": "number", "description": "Amount in quote currency (THB). No trailing zeros." },
                "rat": { "type": "number", "description": "Rate/price. Required for limit orders, ignored for market orders." },
                "typ": { "type": "string", "description": "Order type: \"limit\" or \"market\"" },
                "client_id": { "type": "string", "description": "Custom order ID for tracking (optional)" }
            }),
            &["sym", "amt", "typ"],
        ),
        annotations: mutating("Place Buy Order"),
    }
}

/// Builds the tool definition for `btk_place_ask`.
fn place_ask_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::PlaceAsk,
        description: "Place a sell order. For limit orders specify rate. For market orders, rate \
                      is ignored. WARNING: Uses real money."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "amt": { "type": "number", "description": "Amount in base currency (e.g., BTC amount). No trailing zeros." },
                "rat": { "type": "number", "description": "Rate/price. Required for limit orders, ignored for market orders." },
                "typ": { "type": "string", "description": "Order type: \"limit\" or \"market\"" },
                "client_id": { "type": "string", "description": "Custom order ID for tracking (optional)" }
            }),
            &["sym", "amt", "typ"],
        ),
        annotations: mutating("Place Sell Order"),
    }
}

/// Builds the tool definition for `btk_place_bid_test`.
fn place_bid_test_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::PlaceBidTest,
        description: "Test (dry run) a buy order. Validates parameters without placing an actual \
                      order. Safe to use; no real money involved."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "amt": { "type": "number", "description": "Amount in quote currency (THB)" },
                "rat": { "type": "number", "description": "Rate/price for limit orders" },
                "typ": { "type": "string", "description": "Order type: \"limit\" or \"market\"" },
                "client_id": { "type": "string", "description": "Custom order ID (optional)" }
            }),
            &["sym", "amt", "typ"],
        ),
        annotations: read_only("Test Buy Order (Dry Run)"),
    }
}

/// Builds the tool definition for `btk_place_ask_test`.
fn place_ask_test_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::PlaceAskTest,
        description: "Test (dry run) a sell order. Validates parameters without placing an \
                      actual order. Safe to use; no real money involved."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "amt": { "type": "number", "description": "Amount in base currency" },
                "rat": { "type": "number", "description": "Rate/price for limit orders" },
                "typ": { "type": "string", "description": "Order type: \"limit\" or \"market\"" },
                "client_id": { "type": "string", "description": "Custom order ID (optional)" }
            }),
            &["sym", "amt", "typ"],
        ),
        annotations: read_only("Test Sell Order (Dry Run)"),
    }
}

/// Builds the tool definition for `btk_cancel_order`.
fn cancel_order_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CancelOrder,
        description: "Cancel an open order. Requires symbol, order ID, and side (buy/sell)."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "id": { "type": "string", "description": "Order ID to cancel" },
                "sd": { "type": "string", "description": "Side: \"buy\" or \"sell\"" }
            }),
            &["sym", "id", "sd"],
        ),
        annotations: destructive("Cancel Order"),
    }
}

/// Builds the tool definition for `btk_my_open_orders`.
fn my_open_orders_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::MyOpenOrders,
        description: "Get all open (pending) orders for a symbol.".to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get My Open Orders"),
    }
}

/// Builds the tool definition for `btk_my_order_history`.
fn my_order_history_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::MyOrderHistory,
        description: "Get order history for a symbol. Supports pagination and date range \
                      filtering. History older than 90 days is archived."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "p": { "type": "integer", "description": "Page number (default: 1)" },
                "lmt": { "type": "integer", "description": "Results per page (default: 10, max: 100)" },
                "start": { "type": "integer", "description": "Start timestamp (UNIX milliseconds)" },
                "end": { "type": "integer", "description": "End timestamp (UNIX milliseconds)" },
                "_fields": fields_property()
            }),
            &["sym"],
        ),
        annotations: read_only("Get My Order History"),
    }
}

/// Builds the tool definition for `btk_order_info`.
fn order_info_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::OrderInfo,
        description: "Get detailed information about a specific order including fill history, \
                      status, and remaining amount."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "sym": { "type": "string", "description": "Symbol (e.g., \"THB_BTC\")" },
                "id": { "type": "string", "description": "Order ID" },
                "sd": { "type": "string", "description": "Side: \"buy\" or \"sell\"" },
                "_fields": fields_property()
            }),
            &["sym", "id", "sd"],
        ),
        annotations: read_only("Get Order Info"),
    }
}

// ============================================================================
// SECTION: Crypto Wallet Tools
// ============================================================================

/// Builds the tool definition for `btk_crypto_addresses`.
fn crypto_addresses_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CryptoAddresses,
        description: "List all crypto deposit addresses for your account. Shows currency, \
                      address, tag/memo, and network."
            .to_string(),
        input_schema: object_schema(json!({
            "p": { "type": "integer", "description": "Page number" },
            "lmt": { "type": "integer", "description": "Results per page" },
            "_fields": fields_property()
        })),
        annotations: read_only("List Crypto Addresses"),
    }
}

/// Builds the tool definition for `btk_crypto_withdraw`.
fn crypto_withdraw_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CryptoWithdraw,
        description: "Withdraw crypto to an external address. WARNING: IRREVERSIBLE. \
                      Double-check address, network, and amount before executing."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "cur": { "type": "string", "description": "Currency (e.g., \"BTC\", \"ETH\")" },
                "amt": { "type": "number", "description": "Amount to withdraw" },
                "adr": { "type": "string", "description": "Destination address" },
                "mem": { "type": "string", "description": "Memo/tag (required for some networks like XRP, ATOM)" },
                "net": { "type": "string", "description": "Network (e.g., \"BTC\", \"ETH\", \"BSC\", \"TRC20\")" }
            }),
            &["cur", "amt", "adr", "net"],
        ),
        annotations: destructive("Withdraw Crypto"),
    }
}

/// Builds the tool definition for `btk_crypto_internal_withdraw`.
fn crypto_internal_withdraw_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CryptoInternalWithdraw,
        description: "Transfer crypto to another Bitkub user by email or phone number. Faster \
                      and cheaper than blockchain withdrawal. WARNING: IRREVERSIBLE."
            .to_string(),
        input_schema: object_schema_required(
            json!({
                "cur": { "type": "string", "description": "Currency (e.g., \"BTC\", \"ETH\")" },
                "amt": { "type": "number", "description": "Amount to transfer" },
                "adr": { "type": "string", "description": "Destination Bitkub email or phone number" },
                "mem": { "type": "string", "description": "Memo (optional)" }
            }),
            &["cur", "amt", "adr"],
        ),
        annotations: destructive("Internal Withdraw (Bitkub-to-Bitkub)"),
    }
}

/// Builds the tool definition for `btk_crypto_deposit_history`.
fn crypto_deposit_history_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CryptoDepositHistory,
        description: "Get crypto deposit history with status, confirmations, and transaction \
                      details."
            .to_string(),
        input_schema: object_schema(json!({
            "p": { "type": "integer", "description": "Page number" },
            "lmt": { "type": "integer", "description": "Results per page" },
            "_fields": fields_property()
        })),
        annotations: read_only("Get Deposit History"),
    }
}

/// Builds the tool definition for `btk_crypto_withdraw_history`.
fn crypto_withdraw_history_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CryptoWithdrawHistory,
        description: "Get crypto withdrawal history with status, fees, and transaction details."
            .to_string(),
        input_schema: object_schema(json!({
            "p": { "type": "integer", "description": "Page number" },
            "lmt": { "type": "integer", "description": "Results per page" },
            "_fields": fields_property()
        })),
        annotations: read_only("Get Withdrawal History"),
    }
}

/// Builds the tool definition for `btk_crypto_generate_address`.
fn crypto_generate_address_definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::CryptoGenerateAddress,
        description: "Generate a new crypto deposit address for a specific currency.".to_string(),
        input_schema: object_schema_required(
            json!({
                "cur": { "type": "string", "description": "Currency (e.g., \"BTC\", \"ETH\")" }
            }),
            &["cur"],
        ),
        annotations: mutating("Generate Deposit Address"),
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

    use super::tool_definitions;
    use crate::types::ToolName;

    #[test]
    fn listing_covers_every_tool_exactly_once() {
        let definitions = tool_definitions();
        assert_eq!(definitions.len(), 28);
        let names: Vec<ToolName> = definitions.iter().map(|definition| definition.name).collect();
        assert_eq!(names, ToolName::all().to_vec());
    }

    #[test]
    fn every_schema_is_an_object_schema() {
        for definition in tool_definitions() {
            let schema = &definition.input_schema;
            assert_eq!(
                schema.get("type").and_then(Value::as_str),
                Some("object"),
                "tool {}",
                definition.name
            );
            assert!(schema.get("properties").is_some_and(Value::is_object));
        }
    }

    #[test]
    fn destructive_tools_are_flagged() {
        for definition in tool_definitions() {
            let destructive = matches!(
                definition.name,
                ToolName::CancelOrder | ToolName::CryptoWithdraw | ToolName::CryptoInternalWithdraw
            );
            assert_eq!(definition.annotations.destructive_hint, destructive);
        }
    }

    #[test]
    fn read_only_hints_match_auth_free_and_query_tools() {
        for definition in tool_definitions() {
            if !definition.name.requires_auth() {
                assert!(definition.annotations.read_only_hint, "tool {}", definition.name);
            }
            if definition.annotations.destructive_hint {
                assert!(!definition.annotations.read_only_hint);
            }
        }
    }

    #[test]
    fn listing_serializes_with_mcp_field_names() {
        let definitions = tool_definitions();
        let listed = serde_json::to_value(&definitions).unwrap();
        let first = &listed[0];
        assert_eq!(first["name"], "btk_server_time");
        assert!(first.get("inputSchema").is_some());
        assert_eq!(first["annotations"]["readOnlyHint"], Value::Bool(true));
        assert!(first.get("input_schema").is_none());
    }
}
