//! MCP server implementation.
//!
//! Wraps a [`Dispatcher`] and exposes the warehouse tools over the MCP
//! protocol. Protocol problems become JSON-RPC errors; tool problems become
//! `tools/call` results with `isError` set.

use serde::Serialize;
use serde_json::Value;

use wrhs_tool_runtime::{Dispatcher, Invocation};

use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

/// MCP server that bridges a [`Dispatcher`] to MCP clients.
pub struct McpServer {
    dispatcher: Dispatcher,
    server_name: String,
    server_version: String,
}

impl McpServer {
    /// Create a new MCP server over the given dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            server_name: "wrhs-api".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Run the server loop, reading from and writing to the transport.
    ///
    /// Processes JSON-RPC requests until the transport is closed.
    pub async fn run<T: McpTransport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(server = %self.server_name, "MCP server starting");

        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "Received message");

            if let Some(response) = self.handle_message(&line).await {
                let json = serde_json::to_string(&response)?;
                tracing::debug!(response = %json, "Sending response");
                transport.send(&json).await?;
            }
        }

        tracing::info!("Transport closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub async fn handle_message(&mut self, line: &str) -> Option<JsonRpcResponse> {
        // Distinguish requests (have "id") from notifications (no "id")
        // by parsing as generic Value first.
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON");
                return Some(error_response(None, McpError::JsonParse(e)));
            }
        };

        if raw.get("id").is_none() {
            match serde_json::from_value::<JsonRpcNotification>(raw) {
                Ok(notif) => self.handle_notification(&notif),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring malformed notification");
                }
            }
            return None;
        }

        // Echo the id back on invalid requests when it is at least well-formed.
        let id = raw
            .get("id")
            .and_then(|id| serde_json::from_value::<RpcId>(id.clone()).ok());

        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC request");
                return Some(error_response(id, McpError::InvalidRequest(e.to_string())));
            }
        };

        Some(self.handle_request(&request).await)
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, &request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, &request.params).await,
            method => {
                tracing::warn!(method = %method, "Unknown method");
                error_response(Some(id), McpError::MethodNotFound(method.to_string()))
            }
        }
    }

    fn handle_notification(&self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" => {
                tracing::info!("Client confirmed initialization");
            }
            "notifications/cancelled" => {
                tracing::debug!("Client cancelled a request");
            }
            method => {
                tracing::debug!(method = %method, "Unknown notification, ignoring");
            }
        }
    }

    fn handle_initialize(&self, id: RpcId, params: &Option<Value>) -> JsonRpcResponse {
        let client = params
            .clone()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok())
            .and_then(|p| p.client_info)
            .map(|info| info.name)
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(client = %client, "Handling initialize");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        };

        success_response(id, &result)
    }

    fn handle_list_tools(&self, id: RpcId) -> JsonRpcResponse {
        tracing::debug!("Handling tools/list");

        let tools: Vec<ToolInfo> = self
            .dispatcher
            .definitions()
            .into_iter()
            .map(ToolInfo::from)
            .collect();

        success_response(id, &ListToolsResult { tools })
    }

    async fn handle_call_tool(&self, id: RpcId, params: &Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return error_response(Some(id), McpError::InvalidParams("missing params".to_string()));
        };

        let call_params: CallToolParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return error_response(Some(id), McpError::InvalidParams(e.to_string())),
        };

        tracing::debug!(tool = %call_params.name, "Handling tools/call");

        let result = self
            .dispatcher
            .handle(Invocation::new(call_params.name, call_params.arguments))
            .await;

        success_response(id, &CallToolResult::from(result))
    }
}

fn success_response<T: Serialize>(id: RpcId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(val) => JsonRpcResponse::success(id, val),
        Err(e) => error_response(Some(id), McpError::JsonParse(e)),
    }
}

fn error_response(id: Option<RpcId>, err: McpError) -> JsonRpcResponse {
    let rpc = err.to_rpc_error();
    JsonRpcResponse::error(id, rpc.code, rpc.message)
}
