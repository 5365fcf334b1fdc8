use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::kernel::types::Regime;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_hysteresis_bands"))]
pub struct HysteresisThresholds {
    #[validate(range(min = 0.0, max = 1.0))]
    pub pressure_enter: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub unstable_enter: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub failure_enter: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub pressure_exit_low: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub unstable_exit_low: f64,
}

impl Default for HysteresisThresholds {
    fn default() -> Self {
        Self {
            pressure_enter: 0.20,
            unstable_enter: 0.50,
            failure_enter: 0.80,
            pressure_exit_low: 0.15,
            unstable_exit_low: 0.45,
        }
    }
}

fn validate_hysteresis_bands(thresholds: &HysteresisThresholds) -> Result<(), ValidationError> {
    if thresholds.pressure_exit_low >= thresholds.pressure_enter {
        return Err(ValidationError::new("pressure_band")
            .with_message("pressure_exit_low must be below pressure_enter".into()));
    }
    if thresholds.unstable_exit_low >= thresholds.unstable_enter {
        return Err(ValidationError::new("unstable_band")
            .with_message("unstable_exit_low must be below unstable_enter".into()));
    }
    if !(thresholds.pressure_enter < thresholds.unstable_enter
        && thresholds.unstable_enter < thresholds.failure_enter)
    {
        return Err(ValidationError::new("enter_order").with_message(
            "enter thresholds must increase: pressure < unstable < failure".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    PressureEnter,
    UnstableEnter,
    FailureEnter,
    PressureExitLow,
    UnstableExitLow,
}

impl HysteresisThresholds {
    pub fn value(&self, threshold: Threshold) -> f64 {
        match threshold {
            Threshold::PressureEnter => self.pressure_enter,
            Threshold::UnstableEnter => self.unstable_enter,
            Threshold::FailureEnter => self.failure_enter,
            Threshold::PressureExitLow => self.pressure_exit_low,
            Threshold::UnstableExitLow => self.unstable_exit_low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    AtOrAbove(Threshold),
    Below(Threshold),
}

impl Band {
    fn contains(self, risk: f64, thresholds: &HysteresisThresholds) -> bool {
        match self {
            Band::AtOrAbove(threshold) => risk >= thresholds.value(threshold),
            Band::Below(threshold) => risk < thresholds.value(threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Regime,
    pub band: Band,
    pub to: Regime,
}

/// Ordered rules; the first rule matching the current regime and risk wins,
/// otherwise the regime is kept. FAILURE has no outgoing rule.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: Regime::Stable,
        band: Band::AtOrAbove(Threshold::FailureEnter),
        to: Regime::Failure,
    },
    Transition {
        from: Regime::Stable,
        band: Band::AtOrAbove(Threshold::PressureEnter),
        to: Regime::Pressure,
    },
    Transition {
        from: Regime::Pressure,
        band: Band::AtOrAbove(Threshold::FailureEnter),
        to: Regime::Failure,
    },
    Transition {
        from: Regime::Pressure,
        band: Band::AtOrAbove(Threshold::UnstableEnter),
        to: Regime::Unstable,
    },
    Transition {
        from: Regime::Pressure,
        band: Band::Below(Threshold::PressureExitLow),
        to: Regime::Stable,
    },
    Transition {
        from: Regime::Unstable,
        band: Band::AtOrAbove(Threshold::FailureEnter),
        to: Regime::Failure,
    },
    Transition {
        from: Regime::Unstable,
        band: Band::Below(Threshold::UnstableExitLow),
        to: Regime::Pressure,
    },
];

pub fn next_regime(current: Regime, risk: f64, thresholds: &HysteresisThresholds) -> Regime {
    TRANSITIONS
        .iter()
        .filter(|rule| rule.from == current)
        .find(|rule| rule.band.contains(risk, thresholds))
        .map(|rule| rule.to)
        .unwrap_or(current)
}

#[derive(Debug, Clone)]
pub struct RegimeMachine {
    current: Regime,
    thresholds: HysteresisThresholds,
}

impl RegimeMachine {
    pub fn new(thresholds: HysteresisThresholds) -> Self {
        Self {
            current: Regime::Stable,
            thresholds,
        }
    }

    pub fn current(&self) -> Regime {
        self.current
    }

    /// Applies one evaluation and returns the previous regime when it changed.
    pub fn update(&mut self, risk: f64) -> Option<Regime> {
        let next = next_regime(self.current, risk, &self.thresholds);
        if next == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, next);
        Some(previous)
    }
}
