//! Invocation dispatch.
//!
//! [`Dispatcher::handle`] is the boundary where every failure is flattened
//! into an error [`ToolResult`]. Nothing below it produces results directly,
//! and nothing above it ever sees a [`ToolError`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::ToolRegistry;
use crate::tool::{ToolDefinition, ToolError, ToolResult};

/// One request to run a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl Invocation {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Routes invocations to registered tools. Cheap to clone and share.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Catalog for discovery requests.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.list()
    }

    /// Run one invocation. Always yields exactly one result.
    pub async fn handle(&self, invocation: Invocation) -> ToolResult {
        match self.run(invocation).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => {
                warn!(error = %e, "Tool invocation failed");
                ToolResult::error(&e.to_string())
            }
        }
    }

    async fn run(&self, invocation: Invocation) -> Result<String, ToolError> {
        let tool = self
            .registry
            .get(&invocation.tool_name)
            .ok_or_else(|| ToolError::UnknownTool(invocation.tool_name.clone()))?;

        debug!(tool = %invocation.tool_name, "Dispatching invocation");

        let payload = tool.execute(invocation.arguments).await?;
        Ok(serde_json::to_string_pretty(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::testing::MockWarehouse;
    use crate::tools::warehouse_registry;
    use serde_json::json;
    use wrhs_core::UpstreamError;

    fn dispatcher(mock: &Arc<MockWarehouse>) -> Dispatcher {
        Dispatcher::new(warehouse_registry(mock.bindings(), RetryPolicy::default()).unwrap())
    }

    #[tokio::test]
    async fn test_get_head_success() {
        let mock = MockWarehouse::new();
        mock.push_ok(json!({"headVersion": "1.0.0", "latestVersion": "1.0.0"}));

        let result = dispatcher(&mock)
            .handle(Invocation::new(
                "get_head",
                json!({"name": "@ux/test-package", "env": "production"}),
            ))
            .await;

        assert!(!result.is_error);
        assert!(result.content.contains("headVersion"));
        assert!(result.content.contains("1.0.0"));
        assert_eq!(mock.called_names(), vec!["@ux/test-package"]);
    }

    #[tokio::test]
    async fn test_success_is_pretty_printed_with_sorted_keys() {
        let mock = MockWarehouse::new();
        mock.push_ok(json!({"latestVersion": "2.0.0", "headVersion": "1.9.0"}));

        let result = dispatcher(&mock)
            .handle(Invocation::new("get_head", json!({"name": "@ux/a", "env": "test"})))
            .await;

        assert_eq!(
            result.content,
            "{\n  \"headVersion\": \"1.9.0\",\n  \"latestVersion\": \"2.0.0\"\n}"
        );
    }

    #[tokio::test]
    async fn test_missing_name_for_get_object() {
        let mock = MockWarehouse::new();
        let result = dispatcher(&mock)
            .handle(Invocation::new("get_object", json!({"env": "development"})))
            .await;

        assert!(result.is_error);
        assert_eq!(result.content, "Error: Both name and env are required");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_name_for_single_field_tools() {
        let mock = MockWarehouse::new();
        let d = dispatcher(&mock);
        for tool in ["list_versions", "list_environments"] {
            let result = d.handle(Invocation::new(tool, json!({"name": ""}))).await;
            assert!(result.is_error);
            assert_eq!(result.content, "Error: name is required");
        }
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let mock = MockWarehouse::new();
        let result = dispatcher(&mock)
            .handle(Invocation::new("delete_object", json!({"name": "widget"})))
            .await;

        assert!(result.is_error);
        assert_eq!(result.content, "Error: Unknown tool: delete_object");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_versions_retries_with_prefix() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(404, "Not Found"))
            .push_ok(json!([{"version": "1.0.0"}, {"version": "1.1.0"}]));

        let result = dispatcher(&mock)
            .handle(Invocation::new("list_versions", json!({"name": "widget"})))
            .await;

        assert!(!result.is_error);
        assert!(result.content.contains("1.0.0"));
        assert!(result.content.contains("1.1.0"));
        assert_eq!(mock.called_names(), vec!["widget", "@ux/widget"]);
    }

    #[tokio::test]
    async fn test_exhausted_retry_names_both_attempts() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(404, "Not Found"))
            .push_err(UpstreamError::api(404, "Object missing"));

        let result = dispatcher(&mock)
            .handle(Invocation::new("list_environments", json!({"name": "widget"})))
            .await;

        assert!(result.is_error);
        assert!(result.content.starts_with("Error: "));
        assert!(result.content.contains("'widget'"));
        assert!(result.content.contains("'@ux/widget'"));
        assert!(result.content.contains("Object missing"));
    }

    #[tokio::test]
    async fn test_prefixed_not_found_surfaces_original() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(404, "Object not found"));

        let result = dispatcher(&mock)
            .handle(Invocation::new(
                "get_environment_details",
                json!({"name": "@ux/widget", "env": "production"}),
            ))
            .await;

        assert!(result.is_error);
        assert_eq!(result.content, "Error: Object not found");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_other_upstream_error_not_retried() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(401, "Unauthorized"));

        let result = dispatcher(&mock)
            .handle(Invocation::new("get_head", json!({"name": "widget", "env": "production"})))
            .await;

        assert!(result.is_error);
        assert_eq!(result.content, "Error: Unauthorized");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_upstream_message_falls_back() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(500, ""));

        let result = dispatcher(&mock)
            .handle(Invocation::new("list_versions", json!({"name": "widget"})))
            .await;

        assert_eq!(result.content, "Error: Unknown error occurred");
    }

    #[tokio::test]
    async fn test_keeps_serving_after_failure() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(500, "boom"))
            .push_ok(json!({"env": "production"}));
        let d = dispatcher(&mock);

        let first = d
            .handle(Invocation::new("list_environments", json!({"name": "@ux/a"})))
            .await;
        let second = d
            .handle(Invocation::new("list_environments", json!({"name": "@ux/a"})))
            .await;

        assert!(first.is_error);
        assert!(!second.is_error);
    }

    #[tokio::test]
    async fn test_concurrent_invocations_share_dispatcher() {
        let mock = MockWarehouse::new();
        let d = dispatcher(&mock);
        let other = d.clone();

        let (a, b) = tokio::join!(
            d.handle(Invocation::new("list_versions", json!({"name": "@ux/a"}))),
            other.handle(Invocation::new("list_environments", json!({"name": "@ux/b"}))),
        );

        assert!(!a.is_error);
        assert!(!b.is_error);
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_invocation_arguments_default_to_null() {
        let inv: Invocation = serde_json::from_value(json!({"toolName": "get_head"})).unwrap();
        assert!(inv.arguments.is_null());
    }
}
