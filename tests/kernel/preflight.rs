use std::sync::Arc;

use coherence_kernel::{
    CoherenceKernel, KernelConfig, PreflightOutcome, Priority, Regime,
    kernel::ManualClock,
};

use crate::support::{BrokenFailureSink, harness, harness_with, saturate};

#[test]
fn given_stable_regime_when_preflighting_then_every_priority_is_admitted() {
    let mut h = harness();

    for priority in [Priority::Low, Priority::Normal, Priority::High, Priority::Critical] {
        let outcome = h.kernel.check_stability_preflight(priority);
        assert!(outcome.is_admitted(), "{priority} should be admitted");
        assert_eq!(outcome.snapshot().regime, Regime::Stable);
    }
    assert!(h.sink.records().is_empty());
}

#[test]
fn given_unstable_regime_when_preflighting_then_low_work_is_shed_and_high_work_passes() {
    let mut h = harness();
    h.kernel.update_context_drift(0.4);
    h.kernel.update_tool_instability(1.0);
    let _ = h.kernel.snapshot_at(1.0);

    let high = h.kernel.check_stability_preflight_at(Priority::High, 2.0);
    assert!(matches!(high, PreflightOutcome::Admit { snapshot } if snapshot.regime == Regime::Unstable));

    let low = h.kernel.check_stability_preflight_at(Priority::Low, 3.0);
    assert!(matches!(
        low,
        PreflightOutcome::LoadShed { priority: Priority::Low, .. }
    ));
    let rejection = low.into_result().expect_err("low work must be shed");
    assert!(!rejection.is_fatal());

    let normal = h.kernel.check_stability_preflight_at(Priority::Normal, 4.0);
    assert!(!normal.is_admitted());
    assert!(h.sink.records().is_empty());
}

#[test]
fn given_collapse_when_preflighting_then_halt_is_returned_and_one_record_is_persisted() {
    let mut h = harness();
    saturate(&mut h.kernel);

    let outcome = h.kernel.check_stability_preflight(Priority::Critical);

    let PreflightOutcome::Halt { snapshot } = outcome else {
        panic!("expected halt, got {outcome:?}");
    };
    assert_eq!(snapshot.regime, Regime::Failure);

    let records = h.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].regime, Regime::Failure);
    assert_eq!(records[0].timestamp, snapshot.timestamp);
    assert_eq!(records[0].risk, snapshot.risk);
    assert_eq!(records[0].emergency_index, snapshot.emergency_index);

    let rejection = outcome.into_result().expect_err("failure must halt");
    assert!(rejection.is_fatal());
}

#[test]
fn given_failure_when_preflighting_repeatedly_then_each_halt_is_persisted() {
    let mut h = harness();
    saturate(&mut h.kernel);
    let _ = h.kernel.snapshot_at(0.0);
    h.kernel.update_tool_instability(0.0);

    for now in [10.0, 20.0] {
        let outcome = h.kernel.check_stability_preflight_at(Priority::High, now);
        assert!(matches!(outcome, PreflightOutcome::Halt { .. }));
    }

    let timestamps: Vec<f64> = h.sink.records().iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![10.0, 20.0]);
}

#[test]
fn given_broken_failure_sink_when_halting_then_outcome_is_still_halt() {
    let mut kernel = CoherenceKernel::with_parts(
        KernelConfig::default(),
        Arc::new(ManualClock::new(0.0)),
        Arc::new(BrokenFailureSink),
    )
    .expect("default config is valid");
    saturate(&mut kernel);

    let outcome = kernel.check_stability_preflight(Priority::Critical);

    assert!(matches!(outcome, PreflightOutcome::Halt { .. }));
    assert_eq!(kernel.regime(), Regime::Failure);
}

#[test]
fn given_risk_walk_when_preflighting_then_regime_climbs_to_failure_and_halts_once() {
    // Only drift counts and alpha is zero, so risk equals drift / dmax.
    let mut config = KernelConfig::default();
    config.alpha = 0.0;
    config.weights.violations = 0.0;
    config.weights.drift = 1.0;
    config.weights.instability = 0.0;
    config.weights.retries = 0.0;
    config.weights.reset_age = 0.0;
    let mut h = harness_with(config);

    let walk = [
        (0.04, Regime::Stable),
        (0.10, Regime::Pressure),
        (0.24, Regime::Unstable),
    ];
    for (step, (drift, expected)) in walk.into_iter().enumerate() {
        h.kernel.update_context_drift(drift);
        let outcome = h.kernel.check_stability_preflight_at(Priority::Critical, step as f64);
        assert!(outcome.is_admitted());
        assert_eq!(outcome.snapshot().regime, expected, "drift {drift}");
    }

    h.kernel.update_context_drift(0.34);
    let outcome = h.kernel.check_stability_preflight_at(Priority::Critical, 3.0);

    assert!(matches!(outcome, PreflightOutcome::Halt { .. }));
    assert!((outcome.snapshot().risk - 0.85).abs() < 1e-9);
    assert_eq!(h.sink.records().len(), 1);
}
