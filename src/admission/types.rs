use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::types::{Regime, Snapshot, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Normal,
    #[default]
    Low,
}

impl Priority {
    /// Work of this priority is deferred while the regime is UNSTABLE.
    pub fn is_sheddable(self) -> bool {
        matches!(self, Priority::Low | Priority::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a stability preflight. Every variant carries the snapshot the
/// decision was made on.
#[must_use = "a preflight outcome must be acted upon before admitting work"]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreflightOutcome {
    Admit { snapshot: Snapshot },
    /// Reject or defer this unit of work only; keep operating.
    LoadShed { priority: Priority, snapshot: Snapshot },
    /// Stop admitting all work. There is no automatic way back.
    Halt { snapshot: Snapshot },
}

impl PreflightOutcome {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            PreflightOutcome::Admit { snapshot }
            | PreflightOutcome::LoadShed { snapshot, .. }
            | PreflightOutcome::Halt { snapshot } => snapshot,
        }
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, PreflightOutcome::Admit { .. })
    }

    pub fn into_result(self) -> Result<Snapshot, Rejection> {
        match self {
            PreflightOutcome::Admit { snapshot } => Ok(snapshot),
            PreflightOutcome::LoadShed { priority, snapshot } => {
                Err(Rejection::LoadShed { priority, snapshot })
            }
            PreflightOutcome::Halt { snapshot } => Err(Rejection::Halt { snapshot }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Rejection {
    #[error("coherence collapse: regime FAILURE at risk {:.3}", .snapshot.risk)]
    Halt { snapshot: Snapshot },
    #[error("shedding {priority} work: regime UNSTABLE at risk {:.3}", .snapshot.risk)]
    LoadShed {
        priority: Priority,
        snapshot: Snapshot,
    },
}

impl Rejection {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Rejection::Halt { .. })
    }
}

/// One line of the append-only failure log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(rename = "ts")]
    pub timestamp: Timestamp,
    pub regime: Regime,
    #[serde(rename = "phi_risk")]
    pub risk: f64,
    #[serde(rename = "E")]
    pub emergency_index: f64,
}

impl From<&Snapshot> for FailureRecord {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            regime: snapshot.regime,
            risk: snapshot.risk,
            emergency_index: snapshot.emergency_index,
        }
    }
}
