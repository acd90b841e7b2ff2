// crates/bitkub-contract/src/prompts.rs
// ============================================================================
// Module: Prompt and Resource Catalogue
// Description: MCP prompts and resources served by the Bitkub gateway.
// Purpose: Provide the static prompt texts and the server-info resource.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The gateway serves two guidance prompts (market data analysis and safe
//! order management) and one `server-info` resource describing the deployed
//! tool surface. Prompt texts are static; the server-info payload takes the
//! deployment-specific fields as arguments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Prompts
// ============================================================================

/// One MCP prompt served by the gateway.
#[derive(Debug, Clone, Copy)]
pub struct PromptDefinition {
    /// Prompt name.
    pub name: &'static str,
    /// One-line prompt description.
    pub description: &'static str,
    /// Full prompt text delivered as a single user message.
    pub text: &'static str,
}

/// Guidance prompt for the public market data tools.
const MARKET_DATA_ANALYSIS: PromptDefinition = PromptDefinition {
    name: "market-data-analysis",
    description: "Guide for fetching and analyzing Bitkub market data",
    text: "You are a Bitkub market data analyst. Help me fetch and analyze crypto market data \
           from Thailand's leading exchange.\n\nAvailable market tools:\n1. **Price check** - \
           btk_ticker for current price, volume, 24hr change (single or all symbols)\n2. \
           **Order book** - btk_bids (buy side), btk_asks (sell side), btk_books (both), \
           btk_depth (no timestamps)\n3. **Recent trades** - btk_recent_trades for latest \
           executed trades\n4. **Candlesticks** - btk_tradingview_history for OHLCV data (1m, \
           5m, 15m, 1h, 4h, 1D)\n5. **Symbols** - btk_symbols for all trading pairs with rules \
           and status\n6. **Server** - btk_server_time for connectivity, btk_server_status for \
           API health\n\nTips:\n- Symbol format: THB_BTC, THB_ETH, THB_ADA (THB prefix with \
           underscore)\n- All prices are in Thai Baht (THB)\n- Market data endpoints are public \
           (no API key needed)\n- Use btk_symbols to check if a pair is \"exchange\" or \
           \"broker\" type",
};

/// Guidance prompt for safe order placement and management.
const TRADING_GUIDE: PromptDefinition = PromptDefinition {
    name: "trading-guide",
    description: "Guide for placing and managing orders on Bitkub safely",
    text: "You are a Bitkub trading assistant. Help me manage orders safely.\n\nWARNING: All \
           trading operations use REAL MONEY.\n\nAvailable trading tools:\n1. **Buy order** - \
           btk_place_bid (limit or market)\n2. **Sell order** - btk_place_ask (limit or \
           market)\n3. **Test buy** - btk_place_bid_test (dry run, no real money)\n4. **Test \
           sell** - btk_place_ask_test (dry run, no real money)\n5. **Cancel order** - \
           btk_cancel_order\n6. **Open orders** - btk_my_open_orders\n7. **Order history** - \
           btk_my_order_history (paginated, 90-day archive)\n8. **Order detail** - \
           btk_order_info (fill history, status)\n\nAccount tools:\n- btk_wallet - available \
           balances\n- btk_balances - available + reserved balances\n- btk_trading_credits - \
           fee credit balance\n- btk_user_limits - deposit/withdrawal limits\n\nALWAYS use test \
           endpoints first (btk_place_bid_test / btk_place_ask_test).\nALWAYS check \
           btk_balances before placing orders.\nALWAYS verify order with btk_order_info after \
           placement.",
};

/// Returns every prompt served by the gateway.
#[must_use]
pub const fn prompt_definitions() -> &'static [PromptDefinition] {
    &[MARKET_DATA_ANALYSIS, TRADING_GUIDE]
}

/// Looks up a prompt by name.
#[must_use]
pub fn find_prompt(name: &str) -> Option<&'static PromptDefinition> {
    prompt_definitions().iter().find(|prompt| prompt.name == name)
}

// ============================================================================
// SECTION: Resources
// ============================================================================

/// URI of the server-info resource.
pub const SERVER_INFO_URI: &str = "bitkub://server-info";

/// One MCP resource served by the gateway.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDefinition {
    /// Resource name.
    pub name: &'static str,
    /// Resource URI.
    pub uri: &'static str,
    /// One-line resource description.
    pub description: &'static str,
    /// MIME type of the resource content.
    pub mime_type: &'static str,
}

/// Returns every resource served by the gateway.
#[must_use]
pub const fn resource_definitions() -> &'static [ResourceDefinition] {
    &[ResourceDefinition {
        name: "server-info",
        uri: SERVER_INFO_URI,
        description: "Connection status and available tools for this Bitkub MCP server",
        mime_type: "application/json",
    }]
}

/// Builds the server-info resource payload.
///
/// `connected` reports whether a complete credential pair is loaded;
/// `version` and `base_url` describe the running deployment.
#[must_use]
pub fn server_info_payload(version: &str, connected: bool, base_url: &str) -> Value {
    json!({
        "name": "bitkub-mcp",
        "version": version,
        "connected": connected,
        "tools_available": crate::tooling::tool_definitions().len(),
        "tool_categories": {
            "general_market_data": 10,
            "account": 4,
            "orders": 8,
            "crypto_wallet": 6,
        },
        "base_url": base_url,
    })
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

    use super::SERVER_INFO_URI;
    use super::find_prompt;
    use super::prompt_definitions;
    use super::resource_definitions;
    use super::server_info_payload;

    #[test]
    fn both_prompts_are_served_and_findable() {
        let prompts = prompt_definitions();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].name, "market-data-analysis");
        assert_eq!(prompts[1].name, "trading-guide");
        assert!(find_prompt("trading-guide").is_some());
        assert!(find_prompt("missing").is_none());
    }

    #[test]
    fn prompt_texts_name_their_tools() {
        let market = find_prompt("market-data-analysis").unwrap();
        assert!(market.text.contains("btk_ticker"));
        assert!(market.text.contains("btk_tradingview_history"));
        let trading = find_prompt("trading-guide").unwrap();
        assert!(trading.text.contains("btk_place_bid_test"));
        assert!(trading.text.contains("REAL MONEY"));
    }

    #[test]
    fn server_info_resource_describes_the_tool_surface() {
        let resources = resource_definitions();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, SERVER_INFO_URI);
        assert_eq!(resources[0].mime_type, "application/json");
        let payload = server_info_payload("0.1.0", false, "https://api.bitkub.com");
        assert_eq!(payload["tools_available"], 28);
        assert_eq!(payload["connected"], false);
        assert_eq!(payload["tool_categories"]["orders"], 8);
    }
}
