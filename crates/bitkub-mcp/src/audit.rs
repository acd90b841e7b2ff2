// crates/bitkub-mcp/src/audit.rs
// ============================================================================
// Module: Audit Logging
// Description: Structured audit events for gateway tool calls.
// Purpose: Emit redacted JSON line logs without hard dependencies.
// Dependencies: bitkub-contract, serde
// ============================================================================

//! ## Overview
//! Every tool call produces one audit event naming the tool, the transport,
//! and the outcome. Events never include tool arguments or response bodies;
//! order parameters and balances stay out of the logs by construction, and
//! credentials never reach this layer at all. Sinks are append-only JSON
//! lines so deployments can route them into their own pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use bitkub_contract::ToolName;
use serde::Serialize;

use crate::config::AuditConfig;
use crate::config::AuditSinkKind;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit event payload for one tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// JSON-RPC request identifier when provided.
    pub request_id: Option<String>,
    /// Tool name when the call named a known tool.
    pub tool: Option<ToolName>,
    /// Outcome label: `ok` or `error`.
    pub outcome: &'static str,
    /// Normalized error kind label on failure.
    pub error_kind: Option<&'static str>,
    /// Call duration in milliseconds.
    pub duration_ms: u64,
}

impl ToolCallAuditEvent {
    /// Returns the current wall-clock timestamp in milliseconds.
    #[must_use]
    pub fn now_ms() -> u128 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for audit events.
pub trait McpAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &ToolCallAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl McpAuditSink for StderrAuditSink {
    fn record(&self, event: &ToolCallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl McpAuditSink for FileAuditSink {
    fn record(&self, event: &ToolCallAuditEvent) {
        if let (Ok(payload), Ok(mut file)) = (serde_json::to_string(event), self.file.lock()) {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that discards every event.
pub struct NoopAuditSink;

impl McpAuditSink for NoopAuditSink {
    fn record(&self, _event: &ToolCallAuditEvent) {}
}

/// Builds the audit sink selected by configuration.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its log file.
pub fn build_audit_sink(config: &AuditConfig) -> io::Result<Arc<dyn McpAuditSink>> {
    match config.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "file sink requires a path")
            })?;
            Ok(Arc::new(FileAuditSink::new(path)?))
        }
        AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
