use std::{fs, path::PathBuf, sync::Arc};

use coherence_kernel::{
    CoherenceKernel, Config, PreflightOutcome, Priority, Regime, admission::JsonlFailureLog,
    kernel::ManualClock,
};
use uuid::Uuid;

use crate::support::saturate;

fn schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("coherence.schema.json")
}

#[test]
fn given_config_file_when_halting_then_failure_log_lands_beside_config() {
    let work_dir = std::env::temp_dir().join(format!("coherence-e2e-{}", Uuid::now_v7()));
    fs::create_dir_all(&work_dir).expect("work dir should be created");
    let config_path = work_dir.join("coherence.jsonc");
    fs::write(
        &config_path,
        format!(
            r#"{{
  "$schema": "{}",
  // tighter window for the test
  "kernel": {{ "window_seconds": 30, "tick_seconds": 5 }},
  "failure_log": {{ "path": "state/panic.log" }},
}}"#,
            schema_path().display()
        ),
    )
    .expect("config should be written");

    let config = Config::load(&config_path).expect("config should load");
    let failure_log = JsonlFailureLog::new(config.failure_log.path.clone());
    let mut kernel = CoherenceKernel::with_parts(
        config.kernel,
        Arc::new(ManualClock::new(0.0)),
        Arc::new(failure_log.clone()),
    )
    .expect("kernel config should be valid");
    assert_eq!(kernel.config().window_seconds, 30);

    saturate(&mut kernel);
    let outcome = kernel.check_stability_preflight(Priority::Low);
    assert!(matches!(outcome, PreflightOutcome::Halt { .. }));

    assert_eq!(failure_log.path(), work_dir.join("state/panic.log"));
    let records = failure_log.read_records().expect("failure log should parse");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].regime, Regime::Failure);
    assert!(records[0].risk > 0.8);

    let _ = fs::remove_dir_all(&work_dir);
}
