//! docqueue - Batch Scheduler for Document Operations
//!
//! docqueue admits document-processing operations (merge, split, watermark,
//! and friends), orders them by priority, runs them against an external
//! engine under a concurrency cap, and retries failures with a fixed delay.
//!
//! # Core Concepts
//!
//! - **Priority Admission**: Higher priority dispatches first; ties keep submission order
//! - **Bounded Concurrency**: Never more than `max-concurrent` operations in flight
//! - **Exactly One Outcome**: Every operation ends completed or failed, with one hook call
//! - **Engine at Arm's Length**: The engine sits behind a trait; the scheduler never
//!   inspects document bytes
//!
//! # Modules
//!
//! - [`domain`] - Operations, kinds, typed options and documents
//! - [`engine`] - Engine trait, execution adapter and simulated engine
//! - [`scheduler`] - Pending queue, dispatch loop, retries and status
//! - [`manifest`] - YAML batch manifests
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod manifest;
pub mod scheduler;

// Re-export commonly used types
pub use config::Config;
pub use domain::{
    Cardinality, Document, NewOperation, Operation, OperationError, OperationId, OperationKind, OperationOptions,
    OperationOutput,
};
pub use engine::{Engine, EngineError, EngineJob, ExecutionError, SimulatedEngine, SimulatedEngineConfig};
pub use manifest::{BatchManifest, ManifestEntry};
pub use scheduler::{Membership, QueueStatus, Scheduler, SchedulerConfig, SchedulerStats};
