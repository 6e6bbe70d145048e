//! Engine and execution error types

use std::time::Duration;
use thiserror::Error;

use crate::domain::{Cardinality, OperationKind};

/// Errors reported by the external processing engine
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Malformed input document {name}: {reason}")]
    MalformedInput { name: String, reason: String },

    #[error("Unsupported option: {0}")]
    Unsupported(String),

    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine fault: {0}")]
    Internal(String),
}

/// Errors from a single execution attempt
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("{kind} requires {expected} input document(s), got {actual}")]
    Cardinality {
        kind: OperationKind,
        expected: Cardinality,
        actual: usize,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine panicked: {0}")]
    Panicked(String),
}

impl ExecutionError {
    /// Check if this is an input cardinality violation
    pub fn is_cardinality(&self) -> bool {
        matches!(self, ExecutionError::Cardinality { .. })
    }

    /// Check if a retry could plausibly succeed
    ///
    /// The scheduler's retry budget applies to every error regardless; this
    /// only classifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExecutionError::Cardinality { .. } => false,
            ExecutionError::Engine(EngineError::MalformedInput { .. }) => false,
            ExecutionError::Engine(EngineError::Unsupported(_)) => false,
            ExecutionError::Engine(EngineError::Timeout(_)) => true,
            ExecutionError::Engine(EngineError::Internal(_)) => true,
            ExecutionError::Timeout(_) => true,
            ExecutionError::Panicked(_) => true,
        }
    }
}
