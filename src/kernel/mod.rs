pub mod aggregate;
pub mod clock;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod formulas;
pub mod regime;
pub mod shared;
pub mod types;
pub mod window;

pub use aggregate::{SignalWeights, aggregate_risk};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::CoherenceKernel;
pub use error::{KernelError, KernelErrorKind};
pub use escalation::{Escalation, EscalationDetector, RiskHistory, RiskSample};
pub use regime::{HysteresisThresholds, RegimeMachine, next_regime};
pub use shared::SharedKernel;
pub use types::{Regime, Signals, Snapshot, Timestamp};
pub use window::{SlidingWindow, WindowTotals};
