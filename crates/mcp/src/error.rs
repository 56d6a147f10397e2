//! Error types for the MCP crate.

use crate::types::{error_codes, JsonRpcError};

/// Protocol-level failures. Tool failures never surface here: they travel
/// inside a successful `tools/call` response with `isError` set.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Failed to parse JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The message is JSON but not a valid JSON-RPC request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested method is not supported.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters for a method.
    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            McpError::JsonParse(_) => error_codes::PARSE_ERROR,
            McpError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::Transport(_) => error_codes::INTERNAL_ERROR,
        };
        JsonRpcError {
            code,
            message: self.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_codes() {
        let err = McpError::MethodNotFound("resources/list".into());
        assert_eq!(err.to_rpc_error().code, error_codes::METHOD_NOT_FOUND);
        assert_eq!(err.to_rpc_error().message, "Method not found: resources/list");

        let err = McpError::InvalidParams("missing params".into());
        assert_eq!(err.to_rpc_error().code, error_codes::INVALID_PARAMS);

        let err = McpError::InvalidRequest("missing method".into());
        assert_eq!(err.to_rpc_error().code, error_codes::INVALID_REQUEST);
    }
}
