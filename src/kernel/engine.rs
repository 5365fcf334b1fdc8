use std::sync::Arc;

use crate::{
    admission::{FailureRecord, FailureSink, NoopFailureSink, PreflightOutcome, Priority, decide},
    config::KernelConfig,
    kernel::{
        aggregate::aggregate_risk,
        clock::{Clock, SystemClock},
        error::KernelError,
        escalation::EscalationDetector,
        formulas,
        regime::RegimeMachine,
        types::{Regime, Signals, Snapshot, Timestamp},
        window::SlidingWindow,
    },
};

/// Owns all mutable scoring state for one monitored subsystem.
///
/// Every call takes `&mut self`; share one instance across tasks through
/// [`SharedKernel`](crate::kernel::SharedKernel).
pub struct CoherenceKernel {
    config: KernelConfig,
    clock: Arc<dyn Clock>,
    failure_sink: Arc<dyn FailureSink>,
    window: SlidingWindow,
    drift: f64,
    instability: f64,
    last_reset: Timestamp,
    /// Latest finite timestamp seen; stands in for non-finite input.
    last_seen: Timestamp,
    escalation: EscalationDetector,
    regime: RegimeMachine,
}

impl CoherenceKernel {
    pub fn new(config: KernelConfig) -> Result<Self, KernelError> {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(NoopFailureSink))
    }

    pub fn with_parts(
        config: KernelConfig,
        clock: Arc<dyn Clock>,
        failure_sink: Arc<dyn FailureSink>,
    ) -> Result<Self, KernelError> {
        config.validate_invariants()?;
        Ok(Self::build(config, clock, failure_sink))
    }

    fn build(config: KernelConfig, clock: Arc<dyn Clock>, failure_sink: Arc<dyn FailureSink>) -> Self {
        let now = clock.now();
        let now = if now.is_finite() { now } else { 0.0 };
        Self {
            window: SlidingWindow::new(config.window_seconds, config.tick_seconds, now),
            escalation: EscalationDetector::new(config.lookback_ticks, config.epsilon),
            regime: RegimeMachine::new(config.thresholds),
            drift: 0.0,
            instability: 0.0,
            last_reset: now,
            last_seen: now,
            config,
            clock,
            failure_sink,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn regime(&self) -> Regime {
        self.regime.current()
    }

    pub fn record_constraint_violation(&mut self, count: u64) {
        self.window.record_violation(count);
    }

    pub fn record_constraint_violation_once(&mut self) {
        self.record_constraint_violation(1);
    }

    pub fn record_request(&mut self, retries: u64) {
        self.window.record_request(retries);
    }

    pub fn record_request_once(&mut self) {
        self.record_request(0);
    }

    pub fn update_context_drift(&mut self, drift: f64) {
        self.drift = formulas::context_drift(drift, self.config.dmax);
    }

    pub fn update_tool_instability(&mut self, open_ratio: f64) {
        self.instability = formulas::tool_instability(open_ratio);
    }

    pub fn record_breaker_reset(&mut self) {
        let now = self.clock.now();
        self.record_breaker_reset_at(now);
    }

    pub fn record_breaker_reset_at(&mut self, now: Timestamp) {
        self.last_reset = self.accept_time(now, "record_breaker_reset");
    }

    pub fn advance(&mut self) {
        let now = self.clock.now();
        self.advance_at(now);
    }

    pub fn advance_at(&mut self, now: Timestamp) {
        let now = self.accept_time(now, "advance");
        self.rotate_window(now);
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let now = self.clock.now();
        self.snapshot_at(now)
    }

    pub fn snapshot_at(&mut self, now: Timestamp) -> Snapshot {
        let now = self.accept_time(now, "snapshot");
        self.rotate_window(now);

        let totals = self.window.totals();
        let reset_age = (now - self.last_reset).max(0.0);
        let signals = Signals {
            violations: formulas::violation_pressure(totals.violations, self.config.lambda1),
            drift: self.drift,
            instability: self.instability,
            retries: formulas::retry_pressure(totals.retries, totals.requests, self.config.rmax),
            reset_age: formulas::reset_staleness(reset_age, self.config.t_target, self.config.k),
        };

        let risk = aggregate_risk(&signals, &self.config.weights, self.config.alpha);
        let escalation = self.escalation.observe(now, risk, signals.instability);

        if let Some(previous) = self.regime.update(risk) {
            tracing::info!(
                target: "kernel",
                from = %previous,
                to = %self.regime.current(),
                risk,
                emergency_index = escalation.emergency_index,
                "regime_transition"
            );
        }

        let snapshot = Snapshot {
            timestamp: now,
            signals,
            risk,
            coherence: 1.0 - risk,
            escalation_rate: escalation.rate,
            breaker_capacity: escalation.breaker_capacity,
            emergency_index: escalation.emergency_index,
            regime: self.regime.current(),
        };
        tracing::debug!(
            target: "kernel",
            risk,
            escalation_rate = snapshot.escalation_rate,
            regime = %snapshot.regime,
            "snapshot_evaluated"
        );
        snapshot
    }

    pub fn check_stability_preflight(&mut self, priority: Priority) -> PreflightOutcome {
        let now = self.clock.now();
        self.check_stability_preflight_at(priority, now)
    }

    #[tracing::instrument(
        name = "kernel_preflight",
        target = "admission",
        skip_all,
        fields(priority = %priority)
    )]
    pub fn check_stability_preflight_at(
        &mut self,
        priority: Priority,
        now: Timestamp,
    ) -> PreflightOutcome {
        let outcome = decide(self.snapshot_at(now), priority);
        match &outcome {
            PreflightOutcome::Halt { snapshot } => {
                self.persist_failure(snapshot);
                tracing::error!(
                    target: "admission",
                    risk = snapshot.risk,
                    emergency_index = snapshot.emergency_index,
                    "stability_halt"
                );
            }
            PreflightOutcome::LoadShed { snapshot, .. } => {
                tracing::info!(target: "admission", risk = snapshot.risk, "load_shed");
            }
            PreflightOutcome::Admit { .. } => {}
        }
        outcome
    }

    /// Replaces a NaN or infinite `now` with the latest finite timestamp.
    fn accept_time(&mut self, now: Timestamp, operation: &'static str) -> Timestamp {
        if now.is_finite() {
            self.last_seen = self.last_seen.max(now);
            return now;
        }
        tracing::warn!(
            target: "kernel",
            operation,
            rejected = now,
            substitute = self.last_seen,
            "non_finite_timestamp"
        );
        self.last_seen
    }

    fn rotate_window(&mut self, now: Timestamp) {
        let ticks = self.window.advance(now);
        if ticks > 0 {
            tracing::trace!(target: "kernel", ticks, "window_rotated");
        }
    }

    /// Best effort: a failed write is logged and never changes the outcome.
    fn persist_failure(&self, snapshot: &Snapshot) {
        if let Err(err) = self.failure_sink.append(&FailureRecord::from(snapshot)) {
            tracing::warn!(
                target: "admission",
                error = %err,
                "failure_record_persist_failed"
            );
        }
    }
}
