use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    admission::{PreflightOutcome, Priority},
    kernel::{
        engine::CoherenceKernel,
        types::{Regime, Snapshot},
    },
};

/// Cloneable handle that serializes every call onto one kernel instance.
#[derive(Clone)]
pub struct SharedKernel {
    inner: Arc<Mutex<CoherenceKernel>>,
}

impl SharedKernel {
    pub fn new(kernel: CoherenceKernel) -> Self {
        Self {
            inner: Arc::new(Mutex::new(kernel)),
        }
    }

    pub async fn record_constraint_violation(&self, count: u64) {
        self.inner.lock().await.record_constraint_violation(count);
    }

    pub async fn record_request(&self, retries: u64) {
        self.inner.lock().await.record_request(retries);
    }

    pub async fn record_request_once(&self) {
        self.inner.lock().await.record_request_once();
    }

    pub async fn update_context_drift(&self, drift: f64) {
        self.inner.lock().await.update_context_drift(drift);
    }

    pub async fn update_tool_instability(&self, open_ratio: f64) {
        self.inner.lock().await.update_tool_instability(open_ratio);
    }

    pub async fn record_breaker_reset(&self) {
        self.inner.lock().await.record_breaker_reset();
    }

    pub async fn advance(&self) {
        self.inner.lock().await.advance();
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn check_stability_preflight(&self, priority: Priority) -> PreflightOutcome {
        self.inner.lock().await.check_stability_preflight(priority)
    }

    pub async fn regime(&self) -> Regime {
        self.inner.lock().await.regime()
    }

    /// Runs `f` with exclusive access, for calls that take explicit timestamps.
    pub async fn with_kernel<R>(&self, f: impl FnOnce(&mut CoherenceKernel) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}
