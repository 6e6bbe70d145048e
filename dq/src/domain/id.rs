//! Operation ID generation
//!
//! IDs are UUIDv7 values, so they are unique for the life of the process
//! and sort roughly by creation time. The short form (first 8 hex chars)
//! is what logs and the CLI print.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique identifier assigned to an operation at submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Generate a fresh ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the short prefix (first 8 hex chars)
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
