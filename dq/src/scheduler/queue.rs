//! Queue types for the scheduler

use std::cmp::Reverse;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::{Operation, OperationId, OperationKind};

/// Dispatch key: higher priority first, then earlier submission
fn dispatch_key(op: &Operation) -> (Reverse<i32>, u64) {
    (Reverse(op.priority()), op.sequence())
}

/// Operations waiting for a concurrency slot, kept in dispatch order
///
/// Always sorted by (priority desc, submission order asc). Insertion is
/// O(n), which is fine at the queue depths a UI produces.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<Arc<Operation>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the position that keeps the queue sorted; returns that position
    pub fn insert(&mut self, op: Arc<Operation>) -> usize {
        let key = dispatch_key(&op);
        let position = self.entries.partition_point(|e| dispatch_key(e) <= key);
        self.entries.insert(position, op);
        position
    }

    /// Remove the next operation to dispatch
    pub fn pop(&mut self) -> Option<Arc<Operation>> {
        self.entries.pop_front()
    }

    /// Drop everything; returns how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: OperationId) -> bool {
        self.entries.iter().any(|op| op.id() == id)
    }

    /// Iterate in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Operation>> {
        self.entries.iter()
    }

    /// Check the ordering invariant
    pub fn is_sorted(&self) -> bool {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(a, b)| dispatch_key(a) < dispatch_key(b))
    }
}

/// Which of the scheduler's sets an operation is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Membership {
    Pending,
    InFlight,
    Completed,
    Failed,
}

impl Membership {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Cumulative scheduler counters
#[derive(Debug, Default, Clone, Serialize)]
pub struct SchedulerStats {
    pub total_submitted: u64,
    pub total_dispatched: u64,
    pub total_retries: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_cleared: u64,
    pub peak_queue_depth: usize,
    pub peak_concurrent: usize,
}

/// Queue entry for dashboard display
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: OperationId,
    pub kind: OperationKind,
    pub priority: i32,
    pub status: QueueEntryStatus,
    /// Failed attempts so far (in-flight entries only)
    pub attempt: u32,
    /// Time since submission (queued) or since dispatch (running)
    pub wait_time: Duration,
}

/// Status of a queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEntryStatus {
    Running,
    Queued,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewOperation, OperationOptions};
    use proptest::prelude::*;

    fn op(priority: i32, sequence: u64) -> Arc<Operation> {
        let new = NewOperation::new(OperationOptions::defaults_for(OperationKind::Merge))
            .unwrap()
            .with_priority(priority);
        Arc::new(Operation::admit(new, OperationId::new(), sequence))
    }

    fn drain(queue: &mut PendingQueue) -> Vec<u64> {
        std::iter::from_fn(|| queue.pop()).map(|op| op.sequence()).collect()
    }

    #[test]
    fn test_higher_priority_first() {
        let mut queue = PendingQueue::new();
        queue.insert(op(1, 0));
        queue.insert(op(5, 1));
        queue.insert(op(-2, 2));

        assert_eq!(drain(&mut queue), vec![1, 0, 2]);
    }

    #[test]
    fn test_same_priority_fifo() {
        let mut queue = PendingQueue::new();
        queue.insert(op(1, 0));
        queue.insert(op(5, 1));
        queue.insert(op(1, 2));

        assert_eq!(drain(&mut queue), vec![1, 0, 2]);
    }

    #[test]
    fn test_insert_returns_position() {
        let mut queue = PendingQueue::new();
        assert_eq!(queue.insert(op(0, 0)), 0);
        assert_eq!(queue.insert(op(0, 1)), 1);
        assert_eq!(queue.insert(op(3, 2)), 0);
        assert_eq!(queue.insert(op(0, 3)), 3);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut queue = PendingQueue::new();
        queue.insert(op(0, 0));
        queue.insert(op(0, 1));

        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.clear(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_contains() {
        let mut queue = PendingQueue::new();
        let first = op(0, 0);
        let id = first.id();
        queue.insert(first);

        assert!(queue.contains(id));
        assert!(!queue.contains(OperationId::new()));
    }

    proptest! {
        #[test]
        fn prop_queue_stays_sorted(priorities in proptest::collection::vec(-5i32..5, 0..64)) {
            let mut queue = PendingQueue::new();
            for (seq, priority) in priorities.iter().enumerate() {
                queue.insert(op(*priority, seq as u64));
                prop_assert!(queue.is_sorted());
            }

            let mut expected: Vec<(i32, u64)> =
                priorities.iter().enumerate().map(|(seq, p)| (*p, seq as u64)).collect();
            expected.sort_by_key(|(p, seq)| (Reverse(*p), *seq));

            let actual: Vec<(i32, u64)> = std::iter::from_fn(|| queue.pop())
                .map(|op| (op.priority(), op.sequence()))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
