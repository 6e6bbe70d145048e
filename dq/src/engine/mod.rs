//! Execution engine boundary
//!
//! The document engine itself is external. This module defines the trait
//! it is reached through ([`Engine`]), the adapter that turns an operation
//! into one engine call ([`ExecutionAdapter`]), and a stand-in engine for
//! driving the scheduler without a real one ([`SimulatedEngine`]).

mod adapter;
mod error;
mod simulated;
mod traits;

pub use adapter::{ExecutionAdapter, check_cardinality};
pub use error::{EngineError, ExecutionError};
pub use simulated::{SimulatedEngine, SimulatedEngineConfig};
pub use traits::{Engine, EngineJob, ProgressFn};

#[cfg(test)]
pub(crate) use traits::mock;
