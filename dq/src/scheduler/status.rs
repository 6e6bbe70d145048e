//! Status aggregation

use serde::Serialize;

/// Point-in-time counts across the scheduler's sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

impl QueueStatus {
    pub fn new(queued: usize, processing: usize, completed: usize, failed: usize) -> Self {
        Self {
            queued,
            processing,
            completed,
            failed,
            total: queued + processing + completed + failed,
        }
    }

    /// Share of operations in a terminal state, rounded to a whole percent
    ///
    /// An empty scheduler counts as 100% done.
    pub fn progress(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let done = (self.completed + self.failed) as u64;
        let total = self.total as u64;
        // Round half up in integer arithmetic
        ((200 * done + total) / (2 * total)) as u8
    }

    /// Nothing left to run
    pub fn is_drained(&self) -> bool {
        self.queued == 0 && self.processing == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_sum() {
        let status = QueueStatus::new(3, 2, 4, 1);
        assert_eq!(status.total, 10);
        assert!(!status.is_drained());
    }

    #[test]
    fn test_empty_is_complete() {
        let status = QueueStatus::default();
        assert_eq!(status.total, 0);
        assert_eq!(status.progress(), 100);
        assert!(status.is_drained());
    }

    #[test]
    fn test_progress_counts_failures_as_done() {
        assert_eq!(QueueStatus::new(2, 0, 1, 1).progress(), 50);
        assert_eq!(QueueStatus::new(0, 0, 0, 3).progress(), 100);
        assert_eq!(QueueStatus::new(4, 0, 0, 0).progress(), 0);
    }

    #[test]
    fn test_progress_rounds() {
        // 1/3 = 33.3 -> 33, 2/3 = 66.7 -> 67, 1/8 = 12.5 -> 13
        assert_eq!(QueueStatus::new(2, 0, 1, 0).progress(), 33);
        assert_eq!(QueueStatus::new(1, 0, 2, 0).progress(), 67);
        assert_eq!(QueueStatus::new(7, 0, 1, 0).progress(), 13);
    }
}
