use crate::{
    admission::types::{PreflightOutcome, Priority},
    kernel::types::{Regime, Snapshot},
};

pub fn decide(snapshot: Snapshot, priority: Priority) -> PreflightOutcome {
    match snapshot.regime {
        Regime::Failure => PreflightOutcome::Halt { snapshot },
        Regime::Unstable if priority.is_sheddable() => {
            PreflightOutcome::LoadShed { priority, snapshot }
        }
        Regime::Stable | Regime::Pressure | Regime::Unstable => {
            PreflightOutcome::Admit { snapshot }
        }
    }
}
