//! Warehouse-backed tools.
//!
//! One generic tool type, parameterized by [`ToolKind`]. Execution is
//! validate → normalize → upstream call through the retry policy.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use wrhs_core::WarehouseBindings;

use crate::catalog::ToolKind;
use crate::registry::{RegistryError, ToolRegistry};
use crate::retry::RetryPolicy;
use crate::tool::{Tool, ToolDefinition, ToolError};

pub struct WarehouseTool {
    kind: ToolKind,
    bindings: WarehouseBindings,
    retry: RetryPolicy,
}

impl WarehouseTool {
    pub fn new(kind: ToolKind, bindings: WarehouseBindings, retry: RetryPolicy) -> Self {
        Self {
            kind,
            bindings,
            retry,
        }
    }
}

#[async_trait]
impl Tool for WarehouseTool {
    fn definition(&self) -> ToolDefinition {
        self.kind.definition()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let params = self.kind.build_params(&input)?;

        debug!(
            tool = self.kind.name(),
            name = %params.name,
            env = params.env.as_deref(),
            "Calling warehouse"
        );

        let kind = self.kind;
        let bindings = &self.bindings;
        self.retry
            .run(&params, |p| async move { kind.invoke(bindings, &p).await })
            .await
    }
}

/// Registry holding all five warehouse tools in catalog order.
pub fn warehouse_registry(
    bindings: WarehouseBindings,
    retry: RetryPolicy,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    for kind in ToolKind::ALL {
        registry.register(WarehouseTool::new(kind, bindings.clone(), retry.clone()))?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockWarehouse, UpstreamOp};
    use serde_json::json;
    use wrhs_core::UpstreamError;

    fn tool(kind: ToolKind, mock: &std::sync::Arc<MockWarehouse>) -> WarehouseTool {
        WarehouseTool::new(kind, mock.bindings(), RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_each_kind_calls_its_operation() {
        let expected = [
            (ToolKind::GetObject, UpstreamOp::ObjectGet),
            (ToolKind::GetHead, UpstreamOp::ObjectGetHead),
            (ToolKind::ListVersions, UpstreamOp::ObjectListVersions),
            (ToolKind::ListEnvironments, UpstreamOp::EnvList),
            (ToolKind::GetEnvironmentDetails, UpstreamOp::EnvGet),
        ];
        for (kind, op) in expected {
            let mock = MockWarehouse::new();
            tool(kind, &mock)
                .execute(json!({"name": "@ux/widget", "env": "production"}))
                .await
                .unwrap();
            let calls = mock.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].0, op);
        }
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_upstream() {
        let mock = MockWarehouse::new();
        let err = tool(ToolKind::GetEnvironmentDetails, &mock)
            .execute(json!({"name": "widget"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingArgument(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_staging_reaches_upstream_as_test() {
        let mock = MockWarehouse::new();
        tool(ToolKind::GetObject, &mock)
            .execute(json!({"name": "@ux/widget", "env": "staging", "version": "2.0.0"}))
            .await
            .unwrap();
        let calls = mock.calls();
        let (_, params) = &calls[0];
        assert_eq!(params.env.as_deref(), Some("test"));
        assert_eq!(params.version.as_deref(), Some("2.0.0"));
    }

    #[tokio::test]
    async fn test_retry_keeps_normalized_env() {
        let mock = MockWarehouse::new();
        mock.push_err(UpstreamError::api(404, "Not Found"))
            .push_ok(json!({"headVersion": "3.1.0"}));

        let payload = tool(ToolKind::GetHead, &mock)
            .execute(json!({"name": "widget", "env": "staging"}))
            .await
            .unwrap();
        assert_eq!(payload["headVersion"], "3.1.0");

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1.name, "@ux/widget");
        assert_eq!(calls[1].1.env.as_deref(), Some("test"));
    }

    #[test]
    fn test_warehouse_registry_has_catalog_order() {
        let registry = warehouse_registry(MockWarehouse::new().bindings(), RetryPolicy::default())
            .unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "get_object",
                "get_head",
                "list_versions",
                "list_environments",
                "get_environment_details"
            ]
        );
    }
}
