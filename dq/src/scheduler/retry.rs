//! Retry policy

use std::time::Duration;

use super::config::SchedulerConfig;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then run the operation again
    Retry { after: Duration },

    /// Budget exhausted; the last error is final
    GiveUp,
}

/// Fixed-delay retry budget
///
/// Pure: the decision depends only on how many attempts have failed, never
/// on the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay())
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decide after `failed_attempts` failures (1 after the first failure)
    pub fn decide(&self, failed_attempts: u32) -> RetryDecision {
        if failed_attempts <= self.max_retries {
            RetryDecision::Retry { after: self.delay }
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Upper bound on attempts for one operation
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
