// crates/bitkub-client/src/sign.rs
// ============================================================================
// Module: Request Signing
// Description: Canonical signing string assembly and HMAC-SHA256 digest.
// Purpose: Produce the signature Bitkub requires on secure endpoints.
// Dependencies: hmac, sha2, hex
// ============================================================================

//! ## Overview
//! Bitkub signs secure requests over the exact concatenation
//! `timestamp + method + path + query + payload`, where `query` includes its
//! leading `?` when non-empty and `payload` is the compact JSON body or the
//! empty string. The signature is the lowercase hex HMAC-SHA256 digest of
//! that string keyed by the account secret. Any deviation in ordering,
//! whitespace, or the `?` prefix produces a signature the server rejects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use thiserror::Error;

/// HMAC-SHA256 instantiation used for request signatures.
type HmacSha256 = Hmac<Sha256>;

/// Signature computation errors.
#[derive(Debug, Error)]
pub enum SignError {
    /// The HMAC instance rejected the key material.
    #[error("hmac key initialization failed")]
    InvalidKey,
}

// ============================================================================
// SECTION: Canonical String
// ============================================================================

/// Builds the canonical signing string for one request.
///
/// `query` must already carry its leading `?` when non-empty; GET requests
/// without parameters and all POST requests pass the empty string. `payload`
/// is the compact JSON body exactly as transmitted, or the empty string when
/// the request has no body. An empty parameter mapping contributes nothing,
/// never `"{}"`.
#[must_use]
pub fn canonical_string(
    timestamp_ms: i64,
    method: &str,
    path: &str,
    query: &str,
    payload: &str,
) -> String {
    format!("{timestamp_ms}{method}{path}{query}{payload}")
}

/// Computes the lowercase hex HMAC-SHA256 digest of a canonical string.
///
/// # Errors
///
/// Returns [`SignError`] when the HMAC instance cannot be keyed. HMAC-SHA256
/// accepts keys of any length, so this is unreachable in practice; it is
/// propagated rather than suppressed so a broken signature can never be sent.
pub fn sign_canonical(secret: &str, canonical: &str) -> Result<String, SignError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignError::InvalidKey)?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
