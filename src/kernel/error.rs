use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelErrorKind {
    InvalidConfig,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct KernelError {
    pub kind: KernelErrorKind,
    pub message: String,
}

impl KernelError {
    pub fn new(kind: KernelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn invalid_config(message: impl Into<String>) -> KernelError {
    KernelError::new(KernelErrorKind::InvalidConfig, message)
}

pub fn persistence_error(message: impl Into<String>) -> KernelError {
    KernelError::new(KernelErrorKind::Persistence, message)
}
