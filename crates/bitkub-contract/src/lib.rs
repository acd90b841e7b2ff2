// crates/bitkub-contract/src/lib.rs
// ============================================================================
// Module: Bitkub Contract
// Description: Canonical MCP tool surface for the Bitkub gateway.
// Purpose: Provide tool names, annotations, and input schemas for MCP listing.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This crate defines the external contract surface of the Bitkub MCP
//! gateway: the closed set of tool names, the safety annotations clients use
//! to gate confirmation prompts, the JSON input schema for every tool, and
//! the static prompt and resource catalogue. The router dispatches on
//! [`ToolName`] so an unhandled tool is a compile error, not a runtime
//! surprise.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod prompts;
pub mod tooling;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use prompts::PromptDefinition;
pub use prompts::ResourceDefinition;
pub use prompts::SERVER_INFO_URI;
pub use prompts::find_prompt;
pub use prompts::prompt_definitions;
pub use prompts::resource_definitions;
pub use prompts::server_info_payload;
pub use tooling::tool_definitions;
pub use types::ToolAnnotations;
pub use types::ToolDefinition;
pub use types::ToolName;
