// crates/bitkub-mcp/src/lib.rs
// ============================================================================
// Module: Bitkub MCP
// Description: MCP server exposing the Bitkub exchange API as tools.
// Purpose: Route JSON-RPC tool calls to the signing REST client.
// Dependencies: bitkub-client, bitkub-contract, axum, tokio
// ============================================================================

//! ## Overview
//! This crate hosts the MCP gateway: a JSON-RPC 2.0 server over stdio, HTTP,
//! or SSE that exposes the 28 Bitkub tools, guidance prompts, and server-info
//! resource defined in `bitkub-contract` and routes every tool call through
//! the signing client in `bitkub-client`. Exchange failures surface as
//! in-band `isError` tool results so agent loops can read them; protocol
//! failures use JSON-RPC error envelopes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod server;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::ToolCallAuditEvent;
pub use config::AuditSinkKind;
pub use config::BitkubMcpConfig;
pub use config::ConfigError;
pub use config::ServerTransport;
pub use server::McpServer;
pub use server::McpServerError;
pub use tools::CallContext;
pub use tools::ToolError;
pub use tools::ToolRouter;
