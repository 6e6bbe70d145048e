//! Scheduler for document operations
//!
//! Admits operations into a priority queue, dispatches them under a
//! concurrency cap, retries failures with a fixed delay, and reports
//! aggregate status on demand.

mod config;
mod core;
mod queue;
mod retry;
mod status;

pub use config::SchedulerConfig;
pub use core::Scheduler;
pub use queue::{Membership, PendingQueue, QueueEntry, QueueEntryStatus, SchedulerStats};
pub use retry::{RetryDecision, RetryPolicy};
pub use status::QueueStatus;
