// crates/bitkub-cli/src/main.rs
// ============================================================================
// Module: Bitkub MCP CLI Entry Point
// Description: Command dispatcher for the Bitkub MCP gateway.
// Purpose: Start the MCP server and inspect the tool catalogue.
// Dependencies: clap, bitkub-contract, bitkub-mcp, tokio
// ============================================================================

//! ## Overview
//! The CLI wraps the Bitkub MCP gateway for local deployments. `serve` loads
//! configuration, reads credentials from the environment (optionally via a
//! `.env` file), and runs the server on the configured transport. `tools`
//! prints the full tool catalogue as JSON for client integration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use bitkub_contract::tool_definitions;
use bitkub_mcp::BitkubMcpConfig;
use bitkub_mcp::McpServer;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "bitkub-mcp", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Bitkub MCP server.
    Serve(ServeCommand),
    /// Print the tool catalogue as JSON.
    Tools,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
struct ServeCommand {
    /// Path to the gateway configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Message shown to the user.
    message: String,
}

impl CliError {
    /// Creates an error from a displayable message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        write_stdout_line(&format!("bitkub-mcp {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        write_stderr_line("no command given; try `bitkub-mcp serve` or `bitkub-mcp tools`")?;
        return Ok(ExitCode::FAILURE);
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Tools => command_tools(),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    // Credentials may come from a local .env file; absence is not an error.
    let _ = dotenvy::dotenv();
    let config = BitkubMcpConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let server = tokio::task::spawn_blocking(move || McpServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server
        .serve()
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `tools` command.
fn command_tools() -> CliResult<ExitCode> {
    let rendered = serde_json::to_string_pretty(&tool_definitions())
        .map_err(|err| CliError::new(format!("tool catalogue serialization failed: {err}")))?;
    write_stdout_line(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(line: &str) -> CliResult<()> {
    writeln!(std::io::stdout(), "{line}")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes one line to stderr.
fn write_stderr_line(line: &str) -> CliResult<()> {
    writeln!(std::io::stderr(), "{line}")
        .map_err(|err| CliError::new(format!("stderr write failed: {err}")))
}

/// Reports a fatal error and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = writeln!(std::io::stderr(), "bitkub-mcp: {message}");
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
