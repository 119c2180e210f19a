use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use errors::StoreError;
use parking_lot::Mutex;
use tenant_core::{TenantFilter, TenantRecord, TenantStore};
use tokio::sync::watch;

/// Store wrapper for exercising failure handling.
///
/// Lookups are recorded before they are answered, so a held lookup is
/// already visible through [`ScriptedStore::calls`].
pub struct ScriptedStore {
    inner: Arc<dyn TenantStore>,
    queued_failures: Mutex<VecDeque<StoreError>>,
    persistent_failure: Mutex<Option<StoreError>>,
    calls: Mutex<Vec<TenantFilter>>,
    gate: watch::Sender<bool>,
}

impl ScriptedStore {
    pub fn new(inner: impl TenantStore + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            queued_failures: Mutex::new(VecDeque::new()),
            persistent_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            gate: watch::Sender::new(true),
        }
    }

    /// Fail the next `times` lookups with `error`.
    pub fn fail_times(&self, times: usize, error: StoreError) {
        let mut queue = self.queued_failures.lock();
        queue.extend(std::iter::repeat_n(error, times));
    }

    /// Fail every lookup with `error` until [`ScriptedStore::heal`] is called.
    pub fn fail_always(&self, error: StoreError) {
        *self.persistent_failure.lock() = Some(error);
    }

    pub fn heal(&self) {
        self.queued_failures.lock().clear();
        *self.persistent_failure.lock() = None;
    }

    /// Hold every lookup in flight until [`ScriptedStore::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> Vec<TenantFilter> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn transient_error() -> StoreError {
        StoreError::ConnectionError {
            backend: "scripted".to_string(),
            reason: "connection reset by peer".to_string(),
        }
    }

    pub fn permanent_error() -> StoreError {
        StoreError::QueryError {
            backend: "scripted".to_string(),
            reason: "permission denied for table organizations".to_string(),
        }
    }

    fn next_failure(&self) -> Option<StoreError> {
        if let Some(error) = self.queued_failures.lock().pop_front() {
            return Some(error);
        }
        self.persistent_failure.lock().clone()
    }
}

#[async_trait]
impl TenantStore for ScriptedStore {
    async fn find_one(&self, filter: &TenantFilter) -> Result<Option<TenantRecord>, StoreError> {
        self.calls.lock().push(filter.clone());

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if let Some(error) = self.next_failure() {
            tracing::debug!("Scripted failure for {}: {}", filter, error);
            return Err(error);
        }

        self.inner.find_one(filter).await
    }

    fn backend(&self) -> &str {
        "scripted"
    }
}
