//! Qontinui MCP Server
//!
//! A Model Context Protocol server that exposes the Qontinui web backend
//! to AI assistants as a set of tools.
//!
//! # Usage
//!
//! ```bash
//! QONTINUI_API_URL=https://api.qontinui.io qontinui-mcp
//! ```
//!
//! # Environment Variables
//!
//! - `QONTINUI_API_URL`: Backend base URL (required)
//! - `QONTINUI_ACCESS_TOKEN`: Pre-issued bearer token
//! - `QONTINUI_EMAIL` / `QONTINUI_PASSWORD`: Credentials for login on demand
//! - `QONTINUI_API_TIMEOUT`: Request timeout in seconds (default: 30)
//! - `QONTINUI_LOG_LEVEL`: Log level (default: `info`)
//! - `RUST_LOG`: Overrides the log filter entirely
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use std::sync::Arc;

use clap::Parser;
use qontinui_client::config::{
    DEFAULT_TIMEOUT_SECS, ENV_ACCESS_TOKEN, ENV_API_TIMEOUT, ENV_API_URL, ENV_EMAIL, ENV_PASSWORD,
};
use qontinui_client::{QontinuiClient, Settings};
use qontinui_mcp::{Dispatcher, QontinuiMcpServer};
use tracing_subscriber::EnvFilter;

/// MCP server for the Qontinui web backend
#[derive(Parser)]
#[command(name = "qontinui-mcp")]
#[command(about = "MCP server for the Qontinui web backend")]
#[command(version)]
struct Args {
    /// Backend base URL
    #[arg(long, env = ENV_API_URL)]
    api_url: String,

    /// Pre-issued bearer token
    #[arg(long, env = ENV_ACCESS_TOKEN, hide_env_values = true)]
    access_token: Option<String>,

    /// Account email for login on demand
    #[arg(long, env = ENV_EMAIL)]
    email: Option<String>,

    /// Account password for login on demand
    #[arg(long, env = ENV_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = ENV_API_TIMEOUT, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Log level for this server's crates
    #[arg(long, env = "QONTINUI_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Feed the parsed values through the same lookup the environment loader uses.
    fn settings(&self) -> qontinui_client::Result<Settings> {
        Settings::from_lookup(|key| match key {
            ENV_API_URL => Some(self.api_url.clone()),
            ENV_ACCESS_TOKEN => self.access_token.clone(),
            ENV_EMAIL => self.email.clone(),
            ENV_PASSWORD => self.password.clone(),
            ENV_API_TIMEOUT => Some(self.timeout.to_string()),
            _ => None,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "qontinui_mcp={level},qontinui_client={level}",
            level = args.log_level
        ))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = args.settings().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    tracing::info!(
        api_url = %settings.api_url,
        token = settings.has_token(),
        credentials = settings.has_credentials(),
        "Starting qontinui-mcp server"
    );

    let client = QontinuiClient::from_settings(&settings)?;
    let server = Arc::new(QontinuiMcpServer::new(Dispatcher::new(client)));
    server.run().await?;

    Ok(())
}
