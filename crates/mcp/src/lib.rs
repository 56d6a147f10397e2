//! MCP (Model Context Protocol) server for the warehouse tools.
//!
//! This crate speaks MCP over JSON-RPC 2.0 so an agent can query the package
//! warehouse through five read-only tools.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP-specific protocol types
//! - **transport**: Pluggable transport layer (stdio, channels)
//! - **server**: MCP server wrapping a `Dispatcher`
//! - **error**: Protocol-level error types
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use wrhs_core::{HttpWarehouseClient, WarehouseBindings, WarehouseConfig};
//! use wrhs_mcp::{McpServer, StdioTransport};
//! use wrhs_tool_runtime::{warehouse_registry, Dispatcher, RetryPolicy};
//!
//! # async fn example() {
//! let config = WarehouseConfig::from_env().unwrap();
//! let client = Arc::new(HttpWarehouseClient::new(&config).unwrap());
//! let registry = warehouse_registry(
//!     WarehouseBindings::from_client(client),
//!     RetryPolicy::from_config(&config.retry),
//! )
//! .unwrap();
//! let mut server = McpServer::new(Dispatcher::new(registry));
//! let mut transport = StdioTransport::stdio();
//! server.run(&mut transport).await.unwrap();
//! # }
//! ```

pub mod types;
pub mod transport;
pub mod server;
pub mod error;

pub use types::*;
pub use transport::{ChannelTransport, LineTransport, McpTransport, StdioTransport};
pub use server::McpServer;
pub use error::McpError;
