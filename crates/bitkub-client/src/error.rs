// crates/bitkub-client/src/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Normalized error channel for Bitkub API calls.
// Purpose: Collapse transport, decode, and application failures into one type.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The Bitkub API reports application failures as small positive integers in
//! the response envelope. This module maps every documented code to its
//! explanation and normalizes transport failures (non-2xx HTTP), malformed
//! bodies, and nonzero envelope codes into [`BitkubError`].
//! Every rendered message embeds both the numeric code and its explanation so
//! callers that log only the message string keep full diagnostic information.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::sign::SignError;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Normalized errors for Bitkub API calls.
///
/// Every error is terminal for the call that produced it; this client
/// performs no retry or backoff. Callers that want retry semantics (for
/// example on code 90, "Server error") must layer them externally.
#[derive(Debug, Error)]
pub enum BitkubError {
    /// A signed call was attempted without a complete credential pair.
    ///
    /// Raised before any network call; the exchange is never contacted.
    #[error("missing credentials: BITKUB_API_KEY and BITKUB_SECRET_KEY are required for this operation")]
    MissingCredentials,
    /// The HTTP layer returned a non-success status.
    #[error("bitkub api error: http status {status}{}", format_embedded_code(.code))]
    Transport {
        /// HTTP status code returned by the server.
        status: u16,
        /// Application error code recovered from the body, when parseable.
        code: Option<i64>,
    },
    /// The response envelope carried a nonzero application error code.
    #[error("bitkub api error {code}: {message}")]
    Api {
        /// Application error code from the response envelope.
        code: i64,
        /// Mapped explanation for the code.
        message: String,
    },
    /// The HTTP client could not be built or the request could not be sent.
    #[error("http request failed: {0}")]
    Http(String),
    /// The response body could not be decoded as JSON.
    #[error("response decode failed: {0}")]
    Decode(String),
    /// The request signature could not be computed.
    #[error("signing failed: {0}")]
    Signing(#[from] SignError),
}

impl BitkubError {
    /// Builds an application error for a nonzero envelope code.
    #[must_use]
    pub fn api(code: i64) -> Self {
        Self::Api {
            code,
            message: describe_code(code),
        }
    }
}

/// Renders the optional embedded application code for transport errors.
fn format_embedded_code(code: &Option<i64>) -> String {
    code.map_or_else(String::new, |code| format!(" (code: {code}, {})", describe_code(code)))
}

// ============================================================================
// SECTION: Code Taxonomy
// ============================================================================

/// Returns the documented explanation for a Bitkub application error code.
///
/// Total over all integers: codes outside the documented range produce
/// `Unknown error (code: N)` rather than failing to explain themselves.
#[must_use]
pub fn describe_code(code: i64) -> String {
    let message = match code {
        1 => "Invalid JSON payload",
        2 => "Missing X-BTK-APIKEY",
        3 => "Invalid API key",
        4 => "API pending for activation",
        5 => "IP not allowed",
        6 => "Missing / invalid signature",
        7 => "Missing timestamp",
        8 => "Invalid timestamp",
        9 => "Invalid user",
        10 => "Invalid parameter",
        11 => "Invalid symbol",
        12 => "Invalid amount",
        13 => "Invalid rate",
        14 => "Improper rate",
        15 => "Amount too low",
        16 => "Failed to get balance",
        17 => "Wallet is empty",
        18 => "Insufficient balance",
        19 => "Failed to insert order",
        20 => "Failed to deduct balance",
        21 => "Invalid order for cancellation",
        22 => "Invalid side",
        23 => "Failed to update order status",
        24 => "Invalid order for lookup",
        25 => "KYC level 1 required",
        30 => "Limit exceeded",
        40 => "Pending withdrawal exists",
        41 => "Invalid currency for withdrawal",
        42 => "Address is not in whitelist",
        43 => "Failed to deduct crypto",
        44 => "Failed to create withdrawal record",
        45 => "Nonce has to be numeric",
        46 => "Invalid nonce",
        47 => "Withdrawal limit exceeded",
        48 => "Invalid bank account",
        49 => "Bank limit exceeded",
        50 => "Pending withdrawal exists",
        51 => "Withdrawal is under maintenance",
        90 => "Server error",
        other => return format!("Unknown error (code: {other})"),
    };
    message.to_string()
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

    use super::BitkubError;
    use super::describe_code;

    #[test]
    fn documented_codes_map_to_exact_messages() {
        assert_eq!(describe_code(3), "Invalid API key");
        assert_eq!(describe_code(18), "Insufficient balance");
        assert_eq!(describe_code(51), "Withdrawal is under maintenance");
        assert_eq!(describe_code(90), "Server error");
    }

    #[test]
    fn taxonomy_is_total_over_all_integers() {
        assert_eq!(describe_code(26), "Unknown error (code: 26)");
        assert_eq!(describe_code(0), "Unknown error (code: 0)");
        assert_eq!(describe_code(-7), "Unknown error (code: -7)");
        assert_eq!(describe_code(12_345), "Unknown error (code: 12345)");
    }

    #[test]
    fn api_error_message_embeds_code_and_explanation() {
        let message = BitkubError::api(18).to_string();
        assert!(message.contains("18"));
        assert!(message.contains("Insufficient balance"));
    }

    #[test]
    fn transport_error_message_embeds_status_and_recovered_code() {
        let with_code = BitkubError::Transport {
            status: 400,
            code: Some(6),
        }
        .to_string();
        assert!(with_code.contains("400"));
        assert!(with_code.contains("Missing / invalid signature"));
        let without_code = BitkubError::Transport {
            status: 503,
            code: None,
        }
        .to_string();
        assert!(without_code.contains("503"));
    }
}
