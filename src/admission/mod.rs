pub mod noop;
pub mod persistence;
pub mod policy;
pub mod ports;
pub mod types;

pub use noop::NoopFailureSink;
pub use persistence::JsonlFailureLog;
pub use policy::decide;
pub use ports::FailureSink;
pub use types::{FailureRecord, PreflightOutcome, Priority, Rejection};
