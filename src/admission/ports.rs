use crate::{admission::types::FailureRecord, kernel::KernelError};

/// Append-only store for failure records.
pub trait FailureSink: Send + Sync {
    fn append(&self, record: &FailureRecord) -> Result<(), KernelError>;
}
