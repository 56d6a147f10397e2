use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wrhs_core::UpstreamError;

/// Describes a tool's interface for agent consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "get_head", "list_versions")
    pub name: String,
    /// Human-readable description for the agent
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
}

/// Result of one invocation, sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Result text: pretty-printed payload or `Error: ...`
    pub content: String,
    /// Whether this result represents an error
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Error result; an empty message falls back to a generic one.
    pub fn error(message: &str) -> Self {
        let message = if message.is_empty() {
            "Unknown error occurred"
        } else {
            message
        };
        Self {
            content: format!("Error: {message}"),
            is_error: true,
        }
    }
}

/// A callable tool.
///
/// Tools are object-safe, Send + Sync, and async.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON arguments, returning the upstream payload.
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A required argument is absent or empty. Holds the caller-facing message.
    #[error("{0}")]
    MissingArgument(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// Both the supplied and the prefixed name failed upstream.
    #[error("'{original}' was not found and retrying as '{alternate}' failed: {source}")]
    UpstreamNotFound {
        original: String,
        alternate: String,
        source: UpstreamError,
    },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}
