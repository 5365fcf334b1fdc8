use std::sync::Arc;

use coherence_kernel::{
    CoherenceKernel, KernelConfig, Priority, Regime, SharedKernel, admission::NoopFailureSink,
    kernel::ManualClock,
};

use crate::support::assert_close;

fn shared_kernel() -> (SharedKernel, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0.0));
    let kernel = CoherenceKernel::with_parts(
        KernelConfig::default(),
        clock.clone(),
        Arc::new(NoopFailureSink),
    )
    .expect("default config is valid");
    (SharedKernel::new(kernel), clock)
}

#[tokio::test]
async fn given_concurrent_producers_when_snapshotting_then_all_violations_are_counted() {
    let (shared, _clock) = shared_kernel();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let handle = shared.clone();
        tasks.push(tokio::spawn(async move {
            handle.record_constraint_violation(1).await;
            handle.record_request_once().await;
        }));
    }
    for task in tasks {
        task.await.expect("producer task should finish");
    }

    let snapshot = shared.snapshot().await;
    assert_close(snapshot.signals.violations, 1.0 - (-5.0f64).exp(), 1e-12);
    assert_eq!(snapshot.signals.retries, 0.0);
}

#[tokio::test]
async fn given_shared_handle_when_driving_to_collapse_then_every_clone_sees_failure() {
    let (shared, clock) = shared_kernel();
    let observer = shared.clone();

    shared.record_constraint_violation(20).await;
    shared.update_context_drift(0.4).await;
    shared.update_tool_instability(1.0).await;
    shared.record_request(3).await;
    clock.advance(1.0);
    shared.advance().await;

    let outcome = shared.check_stability_preflight(Priority::High).await;
    assert!(!outcome.is_admitted());
    assert_eq!(observer.regime().await, Regime::Failure);
}

#[tokio::test]
async fn given_shared_handle_when_using_explicit_time_then_with_kernel_runs_exclusively() {
    let (shared, _clock) = shared_kernel();
    shared.record_breaker_reset().await;

    let snapshot = shared
        .with_kernel(|kernel| {
            kernel.update_context_drift(0.2);
            kernel.snapshot_at(5.0)
        })
        .await;

    assert_eq!(snapshot.timestamp, 5.0);
    assert_close(snapshot.signals.drift, 0.5, 1e-12);
}
