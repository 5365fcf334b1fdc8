use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::kernel::{
    formulas::{DIVISOR_FLOOR, clamp_unit},
    types::Signals,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_weight_sum"))]
pub struct SignalWeights {
    #[validate(range(min = 0.0))]
    pub violations: f64,
    #[validate(range(min = 0.0))]
    pub drift: f64,
    #[validate(range(min = 0.0))]
    pub instability: f64,
    #[validate(range(min = 0.0))]
    pub retries: f64,
    #[validate(range(min = 0.0))]
    pub reset_age: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            violations: 1.5,
            drift: 1.0,
            instability: 2.0,
            retries: 1.0,
            reset_age: 0.5,
        }
    }
}

fn validate_weight_sum(weights: &SignalWeights) -> Result<(), ValidationError> {
    if weights.sum() > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("weight_sum")
            .with_message("at least one signal weight must be positive".into()))
    }
}

impl SignalWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.violations,
            self.drift,
            self.instability,
            self.retries,
            self.reset_age,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Blends the weighted mean with the worst signal so that one saturated
/// signal cannot be averaged away by healthy ones.
pub fn aggregate_risk(signals: &Signals, weights: &SignalWeights, alpha: f64) -> f64 {
    let weighted_sum: f64 = signals
        .as_array()
        .iter()
        .zip(weights.as_array())
        .map(|(phi, weight)| phi * weight)
        .sum();
    let weighted_avg = weighted_sum / weights.sum().max(DIVISOR_FLOOR);
    clamp_unit((1.0 - alpha) * weighted_avg + alpha * signals.worst())
}
