// crates/bitkub-client/src/client.rs
// ============================================================================
// Module: Signing HTTP Client
// Description: Blocking REST client for public and secure Bitkub endpoints.
// Purpose: Execute public GETs and HMAC-signed GET/POST calls with normalized errors.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`BitkubClient`] issues bounded blocking requests against the Bitkub REST
//! API. Public endpoints need only an `Accept` header; secure endpoints carry
//! the API key, a server-supplied millisecond timestamp, and the HMAC-SHA256
//! signature over the canonical request string. Each signed call fetches a
//! fresh server timestamp first, so no local clock ever participates in
//! signing. Responses that carry the `{error, result}` envelope are verified
//! (nonzero `error` fails the call); bodies without the envelope shape pass
//! through untouched. The client performs no retry on any failure path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::credentials::ApiCredentials;
use crate::error::BitkubError;
use crate::sign::canonical_string;
use crate::sign::sign_canonical;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Production REST endpoint for the Bitkub exchange.
pub const DEFAULT_BASE_URL: &str = "https://api.bitkub.com";

/// Configuration for the signing client.
///
/// # Invariants
/// - `base_url` carries no trailing slash; endpoint paths start with `/`.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitkubClientConfig {
    /// Base URL requests are issued against.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for BitkubClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 30_000,
            user_agent: "bitkub-mcp/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Response Envelope
// ============================================================================

/// Standard Bitkub response envelope.
///
/// Most endpoints wrap their data as `{error, result}` with an optional
/// `pagination` block. A `0` error code means success; any other value is an
/// application failure mapped by [`crate::error::describe_code`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    /// Application error code; `0` on success.
    pub error: i64,
    /// Endpoint-specific payload, absent on some failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Pagination block returned by list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Value>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking REST client for the Bitkub exchange.
///
/// # Invariants
/// - Signed calls verify credential completeness before any network traffic.
/// - Signing timestamps always come from `/api/v3/servertime`, never a local clock.
/// - Redirects are not followed.
/// - No failure is retried.
pub struct BitkubClient {
    /// Client configuration.
    config: BitkubClientConfig,
    /// Credential pair for signed endpoints; may be incomplete.
    credentials: ApiCredentials,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl BitkubClient {
    /// Creates a new client from configuration and a credential pair.
    ///
    /// The credential pair may be incomplete; public endpoints work without
    /// it and signed endpoints fail with [`BitkubError::MissingCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`BitkubError::Http`] when the HTTP client cannot be built.
    pub fn new(
        config: BitkubClientConfig,
        credentials: ApiCredentials,
    ) -> Result<Self, BitkubError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| BitkubError::Http(err.to_string()))?;
        Ok(Self {
            config,
            credentials,
            client,
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns true when a complete credential pair is loaded.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_complete()
    }

    /// Issues a public GET request.
    ///
    /// `params` must be a JSON object or `null`; entries with `null` values
    /// are omitted from the query string while `0`, `""`, and `false` are
    /// kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`BitkubError`] on transport failure, non-2xx status, a body
    /// that is not JSON, or a nonzero envelope error code.
    pub fn public_get(&self, path: &str, params: &Value) -> Result<Value, BitkubError> {
        let query = build_query_string(params);
        let url = join_url(&self.config.base_url, path, &query);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|err| BitkubError::Http(err.to_string()))?;
        handle_response(response)
    }

    /// Fetches the server timestamp in milliseconds.
    ///
    /// Every signed call fetches a fresh timestamp; there is no caching and
    /// no retry on failure.
    ///
    /// # Errors
    ///
    /// Returns [`BitkubError`] when the request fails or the body carries no
    /// integer timestamp.
    pub fn server_time(&self) -> Result<i64, BitkubError> {
        let body = self.public_get("/api/v3/servertime", &Value::Null)?;
        body.get("result")
            .and_then(Value::as_i64)
            .or_else(|| body.as_i64())
            .ok_or_else(|| BitkubError::Decode("servertime body carried no timestamp".to_string()))
    }

    /// Issues a signed GET request.
    ///
    /// The query string participates in the signature with its leading `?`
    /// when non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`BitkubError::MissingCredentials`] before any network call
    /// when the credential pair is incomplete, and the usual transport,
    /// decode, and envelope errors otherwise.
    pub fn signed_get(&self, path: &str, params: &Value) -> Result<Value, BitkubError> {
        if !self.credentials.is_complete() {
            return Err(BitkubError::MissingCredentials);
        }
        let timestamp = self.server_time()?;
        let query = build_query_string(params);
        let query_tail = if query.is_empty() {
            String::new()
        } else {
            format!("?{query}")
        };
        let canonical = canonical_string(timestamp, "GET", path, &query_tail, "");
        let signature = sign_canonical(self.credentials.expose_secret(), &canonical)?;
        let url = join_url(&self.config.base_url, path, &query);
        let request = self.signed_headers(self.client.get(url), timestamp, &signature);
        let response = request
            .send()
            .map_err(|err| BitkubError::Http(err.to_string()))?;
        handle_response(response)
    }

    /// Issues a signed POST request.
    ///
    /// An empty or `null` payload contributes the empty string to both the
    /// signature and the request body, never `"{}"`. Non-empty payloads are
    /// transmitted byte-for-byte as the compact JSON that was signed.
    ///
    /// # Errors
    ///
    /// Returns [`BitkubError::MissingCredentials`] before any network call
    /// when the credential pair is incomplete, and the usual transport,
    /// decode, and envelope errors otherwise.
    pub fn signed_post(&self, path: &str, payload: &Value) -> Result<Value, BitkubError> {
        if !self.credentials.is_complete() {
            return Err(BitkubError::MissingCredentials);
        }
        let timestamp = self.server_time()?;
        let body = serialize_payload(payload);
        let canonical = canonical_string(timestamp, "POST", path, "", &body);
        let signature = sign_canonical(self.credentials.expose_secret(), &canonical)?;
        let url = join_url(&self.config.base_url, path, "");
        let mut request = self
            .signed_headers(self.client.post(url), timestamp, &signature)
            .header("Content-Type", "application/json");
        if !body.is_empty() {
            request = request.body(body);
        }
        let response = request
            .send()
            .map_err(|err| BitkubError::Http(err.to_string()))?;
        handle_response(response)
    }

    /// Attaches the three authentication headers to a request.
    fn signed_headers(
        &self,
        request: RequestBuilder,
        timestamp: i64,
        signature: &str,
    ) -> RequestBuilder {
        request
            .header("Accept", "application/json")
            .header("X-BTK-APIKEY", self.credentials.api_key())
            .header("X-BTK-TIMESTAMP", timestamp.to_string())
            .header("X-BTK-SIGN", signature)
    }
}

// ============================================================================
// SECTION: Request Assembly
// ============================================================================

/// Builds the percent-encoded query string for a parameter object.
///
/// `params` must be a JSON object or `null`. Entries whose value is `null`
/// are omitted; `0`, `""`, and `false` are serialized verbatim. Strings are
/// emitted as-is, scalars and composite values via their compact JSON text.
/// Keys are emitted in sorted order so identical parameter sets always sign
/// identically. The result carries no leading `?`.
#[must_use]
pub fn build_query_string(params: &Value) -> String {
    let Some(entries) = params.as_object() else {
        return String::new();
    };
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in entries {
        if value.is_null() {
            continue;
        }
        serializer.append_pair(key, &query_text(value));
    }
    serializer.finish()
}

/// Renders one parameter value as query text.
fn query_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Serializes a POST payload for signing and transmission.
///
/// `null` and the empty object both serialize to the empty string so that a
/// body-less request signs over nothing.
#[must_use]
pub fn serialize_payload(payload: &Value) -> String {
    match payload {
        Value::Null => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}

/// Joins the base URL, endpoint path, and optional query string.
fn join_url(base_url: &str, path: &str, query: &str) -> String {
    if query.is_empty() {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}{path}?{query}")
    }
}

// ============================================================================
// SECTION: Response Handling
// ============================================================================

/// Normalizes an HTTP response into a JSON value or a [`BitkubError`].
///
/// Non-2xx statuses become [`BitkubError::Transport`], recovering the
/// application error code from the body when it parses. Bodies matching the
/// `{error, result}` envelope are verified; anything else passes through.
fn handle_response(response: Response) -> Result<Value, BitkubError> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|err| BitkubError::Http(err.to_string()))?;
    if !status.is_success() {
        // Best-effort code recovery; malformed bodies leave the code empty.
        let code = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_i64))
            .filter(|code| *code != 0);
        return Err(BitkubError::Transport {
            status: status.as_u16(),
            code,
        });
    }
    let body: Value =
        serde_json::from_str(&text).map_err(|err| BitkubError::Decode(err.to_string()))?;
    let envelope_code = serde_json::from_value::<ApiEnvelope>(body.clone())
        .ok()
        .map(|envelope| envelope.error)
        .filter(|code| *code != 0);
    if let Some(code) = envelope_code {
        return Err(BitkubError::api(code));
    }
    Ok(body)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
