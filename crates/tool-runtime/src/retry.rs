//! Alternate-name retry.
//!
//! Some packages are registered upstream only under a namespace prefix
//! (`@ux/`), while callers often use the bare name. When a call fails with a
//! not-found condition and the name is unprefixed, the call is repeated once
//! with the prefixed name. This is a name correction, not a transient-fault
//! retry: there is no backoff and never a second retry.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use wrhs_core::config::{RetryConfig, DEFAULT_NAME_PREFIX, DEFAULT_NOT_FOUND_PATTERNS};
use wrhs_core::{UpstreamError, UpstreamParams};

use crate::tool::ToolError;

/// Decides whether an upstream failure means "no such package".
pub trait NotFoundClassifier: Send + Sync {
    fn is_not_found(&self, error: &UpstreamError) -> bool;
}

/// Matches on status code first, then on case-insensitive fragments of an
/// API error message. Transport and parse failures match on status only:
/// their text embeds the request URL and with it the package name.
#[derive(Debug, Clone)]
pub struct NotFoundMatcher {
    status_codes: Vec<u16>,
    patterns: Vec<String>,
}

impl NotFoundMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            status_codes: vec![404],
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Treat an additional status code as not-found (e.g. 410).
    pub fn with_status(mut self, code: u16) -> Self {
        if !self.status_codes.contains(&code) {
            self.status_codes.push(code);
        }
        self
    }
}

impl Default for NotFoundMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NOT_FOUND_PATTERNS)
    }
}

impl NotFoundClassifier for NotFoundMatcher {
    fn is_not_found(&self, error: &UpstreamError) -> bool {
        if error
            .status()
            .is_some_and(|status| self.status_codes.contains(&status))
        {
            return true;
        }
        let UpstreamError::Api { message, .. } = error else {
            return false;
        };
        let message = message.to_lowercase();
        self.patterns.iter().any(|p| message.contains(p.as_str()))
    }
}

/// Wraps every upstream call with the single alternate-name retry.
#[derive(Clone)]
pub struct RetryPolicy {
    prefix: String,
    classifier: Arc<dyn NotFoundClassifier>,
}

impl RetryPolicy {
    pub fn new(prefix: impl Into<String>, classifier: Arc<dyn NotFoundClassifier>) -> Self {
        Self {
            prefix: prefix.into(),
            classifier,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.name_prefix.clone(),
            Arc::new(NotFoundMatcher::new(&config.not_found_patterns)),
        )
    }

    /// The prefixed name to retry with, or `None` if `name` already carries it.
    pub fn alternate_name(&self, name: &str) -> Option<String> {
        if self.prefix.is_empty() || name.starts_with(&self.prefix) {
            None
        } else {
            Some(format!("{}{}", self.prefix, name))
        }
    }

    /// Run `call` with `params`, retrying once under the alternate name when
    /// the first attempt reports not-found.
    pub async fn run<F, Fut>(&self, params: &UpstreamParams, call: F) -> Result<Value, ToolError>
    where
        F: Fn(UpstreamParams) -> Fut,
        Fut: Future<Output = Result<Value, UpstreamError>>,
    {
        let first = match call(params.clone()).await {
            Ok(payload) => return Ok(payload),
            Err(e) => e,
        };

        if !self.classifier.is_not_found(&first) {
            debug!(name = %params.name, error = %first, "Upstream call failed, not retrying");
            return Err(first.into());
        }

        let Some(alternate) = self.alternate_name(&params.name) else {
            debug!(name = %params.name, "Prefixed name not found, not retrying");
            return Err(first.into());
        };

        info!(name = %params.name, alternate = %alternate, "Not found, retrying with prefixed name");

        call(params.renamed(alternate.clone()))
            .await
            .map_err(|source| ToolError::UpstreamNotFound {
                original: params.name.clone(),
                alternate,
                source,
            })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PREFIX, Arc::new(NotFoundMatcher::default()))
    }
}
