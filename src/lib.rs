pub mod admission;
pub mod config;
pub mod kernel;
pub mod logging;

pub use admission::{PreflightOutcome, Priority, Rejection};
pub use config::{Config, KernelConfig};
pub use kernel::{CoherenceKernel, KernelError, Regime, SharedKernel, Snapshot};
