//! Domain types for document operations
//!
//! - [`NewOperation`] / [`Operation`]: a unit of work before and after submission
//! - [`OperationKind`] / [`OperationOptions`]: what to do, with typed options per kind
//! - [`Document`] / [`OperationOutput`]: opaque payloads in and out

mod document;
mod error;
mod id;
mod kind;
mod operation;
pub mod options;

pub use document::{Document, OperationOutput};
pub use error::OperationError;
pub use id::OperationId;
pub use kind::{Cardinality, OperationKind};
pub use operation::{CompleteHook, ErrorHook, Hooks, NewOperation, Operation, ProgressHook};
pub use options::{OperationOptions, PageRange};
