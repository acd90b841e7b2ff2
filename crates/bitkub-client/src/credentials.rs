// crates/bitkub-client/src/credentials.rs
// ============================================================================
// Module: API Credentials
// Description: Credential pair handling for signed Bitkub requests.
// Purpose: Hold the API key and secret without leaking the secret.
// Dependencies: secrecy, thiserror
// ============================================================================

//! ## Overview
//! A credential pair is an opaque public API key and a private secret. The
//! secret is wrapped in [`secrecy::SecretString`] so it is zeroed on drop and
//! never appears in `Debug` output or logs. Credentials are immutable for the
//! lifetime of a client instance; hosts that rotate credentials must build a
//! new client rather than mutate a shared one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use secrecy::ExposeSecret;
use secrecy::SecretString;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the public API key.
pub const API_KEY_ENV: &str = "BITKUB_API_KEY";
/// Environment variable holding the private secret key.
pub const SECRET_KEY_ENV: &str = "BITKUB_SECRET_KEY";

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Credential pair for signed Bitkub API calls.
///
/// # Invariants
/// - The secret is never serialized, logged, or echoed.
/// - Instances are immutable after construction.
#[derive(Clone)]
pub struct ApiCredentials {
    /// Public API key sent in the `X-BTK-APIKEY` header.
    api_key: String,
    /// Private secret used as the HMAC key.
    secret_key: SecretString,
}

impl ApiCredentials {
    /// Builds a credential pair from explicit values.
    #[must_use]
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Loads credentials from `BITKUB_API_KEY` and `BITKUB_SECRET_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError`] when either variable is unset.
    pub fn from_env() -> Result<Self, CredentialsError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| CredentialsError::MissingEnvVar(API_KEY_ENV))?;
        let secret_key = std::env::var(SECRET_KEY_ENV)
            .map_err(|_| CredentialsError::MissingEnvVar(SECRET_KEY_ENV))?;
        Ok(Self::new(api_key, secret_key))
    }

    /// Returns the public API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Exposes the secret key for signature computation only.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// Returns true when both the key and the secret are non-empty.
    ///
    /// Signed operations must check this before any network call so that a
    /// missing credential surfaces as a precondition error, not a rejected
    /// request.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.secret_key.expose_secret().trim().is_empty()
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Credential loading errors.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
