// crates/bitkub-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Tool identifiers and listing shapes for the Bitkub gateway.
// Purpose: Provide the closed tool name set and MCP listing structures.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Canonical tool identifiers for the Bitkub MCP gateway. The wire names all
//! carry the `btk_` prefix; the enum keeps dispatch exhaustive. Annotations
//! follow the MCP tool annotation hints so clients can distinguish read-only
//! market queries from order placement and irreversible withdrawals.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Canonical tool names for the Bitkub MCP gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolName {
    /// Fetch the exchange server timestamp.
    #[serde(rename = "btk_server_time")]
    ServerTime,
    /// Fetch the exchange endpoint status report.
    #[serde(rename = "btk_server_status")]
    ServerStatus,
    /// List all trading symbols.
    #[serde(rename = "btk_symbols")]
    Symbols,
    /// Fetch 24-hour ticker data.
    #[serde(rename = "btk_ticker")]
    Ticker,
    /// Fetch recent trades for a symbol.
    #[serde(rename = "btk_recent_trades")]
    RecentTrades,
    /// Fetch the buy-side order book.
    #[serde(rename = "btk_bids")]
    Bids,
    /// Fetch the sell-side order book.
    #[serde(rename = "btk_asks")]
    Asks,
    /// Fetch the complete order book.
    #[serde(rename = "btk_books")]
    Books,
    /// Fetch market depth levels.
    #[serde(rename = "btk_depth")]
    Depth,
    /// Fetch TradingView-compatible OHLCV history.
    #[serde(rename = "btk_tradingview_history")]
    TradingviewHistory,
    /// Fetch available balances.
    #[serde(rename = "btk_wallet")]
    Wallet,
    /// Fetch full balances including reserved amounts.
    #[serde(rename = "btk_balances")]
    Balances,
    /// Fetch the trading credit balance.
    #[serde(rename = "btk_trading_credits")]
    TradingCredits,
    /// Fetch deposit and withdrawal limits.
    #[serde(rename = "btk_user_limits")]
    UserLimits,
    /// Place a buy order.
    #[serde(rename = "btk_place_bid")]
    PlaceBid,
    /// Place a sell order.
    #[serde(rename = "btk_place_ask")]
    PlaceAsk,
    /// Dry-run a buy order.
    #[serde(rename = "btk_place_bid_test")]
    PlaceBidTest,
    /// Dry-run a sell order.
    #[serde(rename = "btk_place_ask_test")]
    PlaceAskTest,
    /// Cancel an open order.
    #[serde(rename = "btk_cancel_order")]
    CancelOrder,
    /// List open orders for a symbol.
    #[serde(rename = "btk_my_open_orders")]
    MyOpenOrders,
    /// Fetch order history for a symbol.
    #[serde(rename = "btk_my_order_history")]
    MyOrderHistory,
    /// Fetch details for one order.
    #[serde(rename = "btk_order_info")]
    OrderInfo,
    /// List crypto deposit addresses.
    #[serde(rename = "btk_crypto_addresses")]
    CryptoAddresses,
    /// Withdraw crypto to an external address.
    #[serde(rename = "btk_crypto_withdraw")]
    CryptoWithdraw,
    /// Transfer crypto to another Bitkub account.
    #[serde(rename = "btk_crypto_internal_withdraw")]
    CryptoInternalWithdraw,
    /// Fetch crypto deposit history.
    #[serde(rename = "btk_crypto_deposit_history")]
    CryptoDepositHistory,
    /// Fetch crypto withdrawal history.
    #[serde(rename = "btk_crypto_withdraw_history")]
    CryptoWithdrawHistory,
    /// Generate a new deposit address.
    #[serde(rename = "btk_crypto_generate_address")]
    CryptoGenerateAddress,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerTime => "btk_server_time",
            Self::ServerStatus => "btk_server_status",
            Self::Symbols => "btk_symbols",
            Self::Ticker => "btk_ticker",
            Self::RecentTrades => "btk_recent_trades",
            Self::Bids => "btk_bids",
            Self::Asks => "btk_asks",
            Self::Books => "btk_books",
            Self::Depth => "btk_depth",
            Self::TradingviewHistory => "btk_tradingview_history",
            Self::Wallet => "btk_wallet",
            Self::Balances => "btk_balances",
            Self::TradingCredits => "btk_trading_credits",
            Self::UserLimits => "btk_user_limits",
            Self::PlaceBid => "btk_place_bid",
            Self::PlaceAsk => "btk_place_ask",
            Self::PlaceBidTest => "btk_place_bid_test",
            Self::PlaceAskTest => "btk_place_ask_test",
            Self::CancelOrder => "btk_cancel_order",
            Self::MyOpenOrders => "btk_my_open_orders",
            Self::MyOrderHistory => "btk_my_order_history",
            Self::OrderInfo => "btk_order_info",
            Self::CryptoAddresses => "btk_crypto_addresses",
            Self::CryptoWithdraw => "btk_crypto_withdraw",
            Self::CryptoInternalWithdraw => "btk_crypto_internal_withdraw",
            Self::CryptoDepositHistory => "btk_crypto_deposit_history",
            Self::CryptoWithdrawHistory => "btk_crypto_withdraw_history",
            Self::CryptoGenerateAddress => "btk_crypto_generate_address",
        }
    }

    /// Returns all gateway tool names in canonical listing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ServerTime,
            Self::ServerStatus,
            Self::Symbols,
            Self::Ticker,
            Self::RecentTrades,
            Self::Bids,
            Self::Asks,
            Self::Books,
            Self::Depth,
            Self::TradingviewHistory,
            Self::Wallet,
            Self::Balances,
            Self::TradingCredits,
            Self::UserLimits,
            Self::PlaceBid,
            Self::PlaceAsk,
            Self::PlaceBidTest,
            Self::PlaceAskTest,
            Self::CancelOrder,
            Self::MyOpenOrders,
            Self::MyOrderHistory,
            Self::OrderInfo,
            Self::CryptoAddresses,
            Self::CryptoWithdraw,
            Self::CryptoInternalWithdraw,
            Self::CryptoDepositHistory,
            Self::CryptoWithdrawHistory,
            Self::CryptoGenerateAddress,
        ]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.as_str() == name)
    }

    /// Returns true when the tool targets a signed endpoint.
    ///
    /// Signed tools require a complete credential pair; the ten market data
    /// tools work without one.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(
            self,
            Self::ServerTime
                | Self::ServerStatus
                | Self::Symbols
                | Self::Ticker
                | Self::RecentTrades
                | Self::Bids
                | Self::Asks
                | Self::Books
                | Self::Depth
                | Self::TradingviewHistory
        )
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Listing Shapes
// ============================================================================

/// MCP tool annotation hints.
///
/// Clients use these to decide which calls need explicit confirmation; the
/// hints are advisory and never enforced server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// Human-readable tool title.
    pub title: &'static str,
    /// Tool does not mutate exchange state.
    pub read_only_hint: bool,
    /// Tool can destroy or irreversibly move value.
    pub destructive_hint: bool,
    /// Repeating the call with identical arguments has no further effect.
    pub idempotent_hint: bool,
    /// Tool interacts with an external system.
    pub open_world_hint: bool,
}

/// Tool definition used by MCP tool listing.
///
/// # Invariants
/// - `name` is a stable MCP tool identifier.
/// - `input_schema` is a JSON Schema payload for the tool input shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// Safety annotation hints.
    pub annotations: ToolAnnotations,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
