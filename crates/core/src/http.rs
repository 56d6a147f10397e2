//! HTTP binding of the warehouse API.
//!
//! Routes:
//! - `GET /objects/{name}/{env}`   object payload (`version`, `accepted_variants` query)
//! - `GET /head/{name}/{env}`      head + latest version
//! - `GET /objects/{name}/versions` published versions
//! - `GET /env/{name}`             environments containing the package
//! - `GET /env/{name}/{env}`       environment details
//!
//! Package names are pushed as single path segments, so a scoped name like
//! `@ux/sidebar` is sent as `@ux%2Fsidebar`.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::config::WarehouseConfig;
use crate::error::{ConfigError, UpstreamError};
use crate::warehouse::{EnvApi, ObjectApi, UpstreamParams};

/// Warehouse client authenticating with HTTP basic auth.
pub struct HttpWarehouseClient {
    client: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
}

impl HttpWarehouseClient {
    pub fn new(config: &WarehouseConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.endpoint)
            .map_err(|_| ConfigError::InvalidEndpoint(config.endpoint.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEndpoint(config.endpoint.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch(&self, url: Url, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        debug!(url = %url, "Warehouse request");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                error_message(&body)
            };
            debug!(status = status.as_u16(), message = %message, "Warehouse request failed");
            return Err(UpstreamError::api(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}

/// Prefer the `message` field of a JSON error body, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn required_env(params: &UpstreamParams) -> Result<&str, UpstreamError> {
    params
        .env
        .as_deref()
        .ok_or_else(|| UpstreamError::message("env is required"))
}

fn object_query(params: &UpstreamParams) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(version) = &params.version {
        query.push(("version", version.clone()));
    }
    for variant in params.accepted_variants.iter().flatten() {
        query.push(("accepted_variants", variant.clone()));
    }
    query
}

#[async_trait]
impl ObjectApi for HttpWarehouseClient {
    async fn get(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        let env = required_env(params)?;
        let url = self.url(&["objects", &params.name, env]);
        self.fetch(url, &object_query(params)).await
    }

    async fn get_head(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        let env = required_env(params)?;
        let url = self.url(&["head", &params.name, env]);
        self.fetch(url, &[]).await
    }

    async fn list_versions(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        let url = self.url(&["objects", &params.name, "versions"]);
        self.fetch(url, &[]).await
    }
}

#[async_trait]
impl EnvApi for HttpWarehouseClient {
    async fn list(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        let url = self.url(&["env", &params.name]);
        self.fetch(url, &[]).await
    }

    async fn get(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        let env = required_env(params)?;
        let url = self.url(&["env", &params.name, env]);
        self.fetch(url, &[]).await
    }
}
