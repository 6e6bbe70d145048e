//! Operation construction errors

use thiserror::Error;

use super::kind::OperationKind;

/// Errors raised while building an operation, before it reaches the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Unknown operation kind: '{0}'")]
    UnknownKind(String),

    #[error("Invalid {kind} options: {reason}")]
    InvalidOptions { kind: OperationKind, reason: String },
}

impl OperationError {
    pub(crate) fn invalid(kind: OperationKind, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            kind,
            reason: reason.into(),
        }
    }
}
