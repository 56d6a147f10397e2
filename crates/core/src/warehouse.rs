//! Upstream capability surface of the warehouse API.
//!
//! The warehouse groups its read operations by resource kind: object
//! operations (`get`, `get_head`, `list_versions`) and environment operations
//! (`list`, `get`). Both are expressed as async traits so the dispatch layer
//! can be bound to the HTTP client in production and to an in-memory double
//! in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UpstreamError;

/// Parameters shared by every upstream call. Only `name` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_variants: Option<Vec<String>>,
}

impl UpstreamParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Same parameters addressed at a different package name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Object-scoped warehouse operations.
#[async_trait]
pub trait ObjectApi: Send + Sync {
    /// Full object payload for `name` in `env`, optionally pinned to a version.
    async fn get(&self, params: &UpstreamParams) -> Result<Value, UpstreamError>;

    /// Head and latest version of `name` in `env`.
    async fn get_head(&self, params: &UpstreamParams) -> Result<Value, UpstreamError>;

    /// Every published version of `name`.
    async fn list_versions(&self, params: &UpstreamParams) -> Result<Value, UpstreamError>;
}

/// Environment-scoped warehouse operations.
#[async_trait]
pub trait EnvApi: Send + Sync {
    /// Environments where `name` is deployed.
    async fn list(&self, params: &UpstreamParams) -> Result<Value, UpstreamError>;

    /// Details of `name` in a single environment.
    async fn get(&self, params: &UpstreamParams) -> Result<Value, UpstreamError>;
}

/// Upstream bindings, built once at startup and shared for the process lifetime.
#[derive(Clone)]
pub struct WarehouseBindings {
    pub objects: Arc<dyn ObjectApi>,
    pub envs: Arc<dyn EnvApi>,
}

impl WarehouseBindings {
    /// Bind both resource kinds to one client that implements them.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: ObjectApi + EnvApi + 'static,
    {
        Self {
            objects: client.clone(),
            envs: client,
        }
    }
}
