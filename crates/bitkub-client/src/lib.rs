// crates/bitkub-client/src/lib.rs
// ============================================================================
// Module: Bitkub Client
// Description: Signed REST client for the Bitkub exchange API.
// Purpose: Provide public and HMAC-signed request execution with normalized errors.
// Dependencies: reqwest, hmac, sha2, secrecy, serde_json
// ============================================================================

//! ## Overview
//! This crate implements the Bitkub REST client used by the MCP gateway.
//! Public endpoints are plain GET requests; secure endpoints require three
//! headers: the API key, a server-supplied millisecond timestamp, and an
//! HMAC-SHA256 signature over the canonical request string. All transport
//! and application failures are normalized into [`BitkubError`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod credentials;
pub mod error;
pub mod sign;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ApiEnvelope;
pub use client::BitkubClient;
pub use client::BitkubClientConfig;
pub use client::DEFAULT_BASE_URL;
pub use client::build_query_string;
pub use client::serialize_payload;
pub use credentials::ApiCredentials;
pub use credentials::CredentialsError;
pub use error::BitkubError;
pub use error::describe_code;
pub use sign::SignError;
pub use sign::canonical_string;
pub use sign::sign_canonical;
