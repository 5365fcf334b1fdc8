use crate::{
    admission::{ports::FailureSink, types::FailureRecord},
    kernel::KernelError,
};

#[derive(Debug, Default)]
pub struct NoopFailureSink;

impl FailureSink for NoopFailureSink {
    fn append(&self, _record: &FailureRecord) -> Result<(), KernelError> {
        Ok(())
    }
}
