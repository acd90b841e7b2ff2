// crates/bitkub-mcp/src/config.rs
// ============================================================================
// Module: Gateway Configuration
// Description: Configuration loading and validation for the Bitkub gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits. The
//! gateway runs with pure defaults when no file is present, matching the
//! common stdio deployment where everything comes from environment variables.
//! When a file is named explicitly (argument or `BITKUB_MCP_CONFIG`) it must
//! exist and validate; invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use bitkub_client::BitkubClientConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "bitkub-mcp.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "BITKUB_MCP_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum allowed request body size in bytes.
const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Minimum allowed API request timeout in milliseconds.
const MIN_API_TIMEOUT_MS: u64 = 1_000;
/// Maximum allowed API request timeout in milliseconds.
const MAX_API_TIMEOUT_MS: u64 = 120_000;

/// Default maximum request body size in bytes.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitkubMcpConfig {
    /// MCP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream exchange API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl BitkubMcpConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path` argument, then `BITKUB_MCP_CONFIG`,
    /// then `bitkub-mcp.toml` in the working directory. Only the implicit
    /// default may be absent; a named file that does not exist is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match env::var(CONFIG_ENV_VAR) {
                Ok(value) => (PathBuf::from(value), true),
                Err(_) => (PathBuf::from(DEFAULT_CONFIG_NAME), false),
            },
        };
        if !resolved.exists() {
            if required {
                return Err(ConfigError::Io(format!(
                    "config file not found: {}",
                    resolved.display()
                )));
            }
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.api.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// MCP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Transport type for MCP.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for HTTP or SSE transports.
    #[serde(default)]
    pub bind: Option<String>,
    /// Allow binding a non-loopback address (network exposure opt-in).
    #[serde(default)]
    pub allow_non_loopback: bool,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            allow_non_loopback: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be between 1 and 16777216".to_string(),
            ));
        }
        match self.transport {
            ServerTransport::Stdio => Ok(()),
            ServerTransport::Http | ServerTransport::Sse => {
                let bind = self.bind.as_ref().ok_or_else(|| {
                    ConfigError::Invalid(
                        "server.bind is required for http and sse transports".to_string(),
                    )
                })?;
                let addr = bind.parse::<SocketAddr>().map_err(|_| {
                    ConfigError::Invalid("server.bind must be a socket address".to_string())
                })?;
                if !addr.ip().is_loopback() && !self.allow_non_loopback {
                    return Err(ConfigError::Invalid(
                        "server.bind must be loopback unless allow_non_loopback is set"
                            .to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Transport selection for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP JSON-RPC transport.
    Http,
    /// Use SSE transport for responses.
    Sse,
}

impl ServerTransport {
    /// Returns the lowercase transport label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Sse => "sse",
        }
    }
}

// ============================================================================
// SECTION: API Configuration
// ============================================================================

/// Upstream exchange API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL for the exchange REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Allow cleartext `http://` base URLs (tests only).
    #[serde(default)]
    pub allow_http: bool,
}

/// Default exchange base URL.
fn default_base_url() -> String {
    bitkub_client::DEFAULT_BASE_URL.to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default outbound user agent.
fn default_user_agent() -> String {
    concat!("bitkub-mcp/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            allow_http: false,
        }
    }
}

impl ApiConfig {
    /// Validates API settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Invalid("api.base_url must be set".to_string()));
        }
        if base.ends_with('/') {
            return Err(ConfigError::Invalid(
                "api.base_url must not carry a trailing slash".to_string(),
            ));
        }
        if !base.starts_with("https://") && !(self.allow_http && base.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "api.base_url must use https:// unless allow_http is set".to_string(),
            ));
        }
        if self.timeout_ms < MIN_API_TIMEOUT_MS || self.timeout_ms > MAX_API_TIMEOUT_MS {
            return Err(ConfigError::Invalid(
                "api.timeout_ms must be between 1000 and 120000".to_string(),
            ));
        }
        Ok(())
    }

    /// Converts API settings into a client configuration.
    #[must_use]
    pub fn client_config(&self) -> BitkubClientConfig {
        BitkubClientConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            user_agent: self.user_agent.clone(),
        }
    }
}

// ============================================================================
// SECTION: Audit Configuration
// ============================================================================

/// Audit logging settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection for audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == AuditSinkKind::File && self.path.is_none() {
            return Err(ConfigError::Invalid(
                "audit.path is required for the file sink".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Emit JSON lines to stderr.
    #[default]
    Stderr,
    /// Append JSON lines to a file.
    File,
    /// Discard audit events.
    None,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The configuration failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
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

    use std::io::Write;

    use super::BitkubMcpConfig;
    use super::ServerTransport;

    #[test]
    fn defaults_validate_and_target_stdio() {
        let config = BitkubMcpConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.transport, ServerTransport::Stdio);
        assert_eq!(config.api.base_url, "https://api.bitkub.com");
    }

    #[test]
    fn http_transport_requires_a_bind_address() {
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [server]
            transport = "http"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [server]
            transport = "http"
            bind = "127.0.0.1:8787"
            "#,
        )
        .unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn non_loopback_bind_requires_explicit_opt_in() {
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [server]
            transport = "http"
            bind = "0.0.0.0:8787"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [server]
            transport = "http"
            bind = "0.0.0.0:8787"
            allow_non_loopback = true
            "#,
        )
        .unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn bind_must_be_a_socket_address() {
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [server]
            transport = "sse"
            bind = "not-an-address"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cleartext_base_url_requires_explicit_opt_in() {
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://127.0.0.1:9999"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://127.0.0.1:9999"
            allow_http = true
            "#,
        )
        .unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn file_audit_sink_requires_a_path() {
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [audit]
            sink = "file"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeout_bounds_are_enforced() {
        let config: BitkubMcpConfig = toml::from_str(
            r#"
            [api]
            timeout_ms = 500
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn named_config_file_loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\ntransport = \"http\"\nbind = \"127.0.0.1:0\"\n\n[api]\ntimeout_ms = 5000"
        )
        .unwrap();
        let config = BitkubMcpConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.transport, ServerTransport::Http);
        assert_eq!(config.api.timeout_ms, 5_000);
    }

    #[test]
    fn missing_named_config_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(BitkubMcpConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<BitkubMcpConfig, _> = toml::from_str(
            r#"
            [server]
            transpoort = "stdio"
            "#,
        );
        assert!(parsed.is_err());
    }
}
