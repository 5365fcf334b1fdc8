use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub type Timestamp = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    #[default]
    Stable,
    Pressure,
    Unstable,
    Failure,
}

impl Regime {
    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Stable => "STABLE",
            Regime::Pressure => "PRESSURE",
            Regime::Unstable => "UNSTABLE",
            Regime::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five normalized risk contributions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signals {
    /// phi1: saturating count of constraint violations in the window.
    pub violations: f64,
    /// phi2: context drift relative to the tolerated maximum.
    pub drift: f64,
    /// phi3: fraction of circuit breakers currently open.
    pub instability: f64,
    /// phi4: windowed retry rate relative to the tolerated maximum.
    pub retries: f64,
    /// phi5: staleness of the last breaker reset.
    pub reset_age: f64,
}

impl Signals {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.violations,
            self.drift,
            self.instability,
            self.retries,
            self.reset_age,
        ]
    }

    pub fn worst(&self) -> f64 {
        self.as_array().into_iter().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: Timestamp,
    pub signals: Signals,
    pub risk: f64,
    pub coherence: f64,
    pub escalation_rate: f64,
    pub breaker_capacity: f64,
    pub emergency_index: f64,
    pub regime: Regime,
}
