use std::sync::{Arc, Mutex};

use coherence_kernel::{
    CoherenceKernel, KernelConfig, KernelError,
    admission::{FailureRecord, FailureSink},
    kernel::{ManualClock, error::persistence_error},
};

#[derive(Default)]
pub struct RecordingFailureSink {
    records: Mutex<Vec<FailureRecord>>,
}

impl RecordingFailureSink {
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().expect("sink lock").clone()
    }
}

impl FailureSink for RecordingFailureSink {
    fn append(&self, record: &FailureRecord) -> Result<(), KernelError> {
        self.records.lock().expect("sink lock").push(*record);
        Ok(())
    }
}

pub struct BrokenFailureSink;

impl FailureSink for BrokenFailureSink {
    fn append(&self, _record: &FailureRecord) -> Result<(), KernelError> {
        Err(persistence_error("disk unavailable"))
    }
}

pub struct Harness {
    pub kernel: CoherenceKernel,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<RecordingFailureSink>,
}

pub fn harness() -> Harness {
    harness_with(KernelConfig::default())
}

pub fn harness_with(config: KernelConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(0.0));
    let sink = Arc::new(RecordingFailureSink::default());
    let kernel = CoherenceKernel::with_parts(config, clock.clone(), sink.clone())
        .expect("config should be valid");
    Harness {
        kernel,
        clock,
        sink,
    }
}

/// Drives every signal to its ceiling: many violations, drift at dmax, all
/// breakers open, and one retry per tolerated unit on every request.
pub fn saturate(kernel: &mut CoherenceKernel) {
    kernel.record_constraint_violation(20);
    kernel.update_context_drift(0.4);
    kernel.update_tool_instability(1.0);
    kernel.record_request(3);
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} (+/- {tolerance}), got {actual}"
    );
}
