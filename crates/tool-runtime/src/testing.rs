//! In-memory warehouse double for tests.
//!
//! Replays scripted results in order and records every call it receives.
//! When the script runs dry, calls succeed with an empty object.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use wrhs_core::{EnvApi, ObjectApi, UpstreamError, UpstreamParams, WarehouseBindings};

/// Which upstream operation was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOp {
    ObjectGet,
    ObjectGetHead,
    ObjectListVersions,
    EnvList,
    EnvGet,
}

#[derive(Default)]
pub struct MockWarehouse {
    script: Mutex<VecDeque<Result<Value, UpstreamError>>>,
    calls: Mutex<Vec<(UpstreamOp, UpstreamParams)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockWarehouse {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful response.
    pub fn push_ok(&self, payload: Value) -> &Self {
        lock(&self.script).push_back(Ok(payload));
        self
    }

    /// Queue a failure.
    pub fn push_err(&self, error: UpstreamError) -> &Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<(UpstreamOp, UpstreamParams)> {
        lock(&self.calls).clone()
    }

    /// Names passed to upstream, in call order.
    pub fn called_names(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|(_, p)| p.name.clone()).collect()
    }

    pub fn bindings(self: &Arc<Self>) -> WarehouseBindings {
        WarehouseBindings::from_client(self.clone())
    }

    fn respond(&self, op: UpstreamOp, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        lock(&self.calls).push((op, params.clone()));
        lock(&self.script).pop_front().unwrap_or_else(|| Ok(json!({})))
    }
}

#[async_trait]
impl ObjectApi for MockWarehouse {
    async fn get(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        self.respond(UpstreamOp::ObjectGet, params)
    }

    async fn get_head(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        self.respond(UpstreamOp::ObjectGetHead, params)
    }

    async fn list_versions(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        self.respond(UpstreamOp::ObjectListVersions, params)
    }
}

#[async_trait]
impl EnvApi for MockWarehouse {
    async fn list(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        self.respond(UpstreamOp::EnvList, params)
    }

    async fn get(&self, params: &UpstreamParams) -> Result<Value, UpstreamError> {
        self.respond(UpstreamOp::EnvGet, params)
    }
}
