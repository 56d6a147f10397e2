//! wrhs-mcp: MCP server exposing the package warehouse over stdio.
//!
//! Reads `WRHS_NEXT_ENDPOINT`, `WRHS_NEXT_USERNAME` and `WRHS_NEXT_PASSWORD`
//! (from the environment or `.env`). Logs go to stderr; stdout carries the
//! protocol.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use wrhs_core::config::load_dotenv;
use wrhs_core::{HttpWarehouseClient, WarehouseBindings, WarehouseConfig};
use wrhs_mcp::{McpServer, StdioTransport};
use wrhs_tool_runtime::{warehouse_registry, Dispatcher, RetryPolicy};

// ── CLI ─────────────────────────────────────────────────────────────

/// MCP server for read-only warehouse queries.
#[derive(Parser, Debug)]
#[command(name = "wrhs-mcp", version, about)]
struct Cli {
    /// Config profile; `PROD` reads `PROD_WRHS_NEXT_ENDPOINT` before `WRHS_NEXT_ENDPOINT`.
    #[arg(long, env = "WRHS_PROFILE", default_value = "")]
    profile: String,

    /// Server name reported during initialize.
    #[arg(long, env = "WRHS_SERVER_NAME", default_value = "wrhs-api")]
    server_name: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = WarehouseConfig::for_profile(&cli.profile).context(
        "missing warehouse configuration: set WRHS_NEXT_ENDPOINT, WRHS_NEXT_USERNAME and WRHS_NEXT_PASSWORD",
    )?;
    config.log_summary();

    let client =
        Arc::new(HttpWarehouseClient::new(&config).context("failed to create warehouse client")?);
    let registry = warehouse_registry(
        WarehouseBindings::from_client(client),
        RetryPolicy::from_config(&config.retry),
    )
    .context("failed to register warehouse tools")?;

    let mut server = McpServer::new(Dispatcher::new(registry)).with_name(cli.server_name);
    let mut transport = StdioTransport::stdio();

    info!("Warehouse MCP server running on stdio");
    server
        .run(&mut transport)
        .await
        .context("MCP server failed")?;

    Ok(())
}
