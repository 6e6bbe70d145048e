//! Scheduler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max operations executing at once
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Additional attempts after the first failure (0 disables retry)
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between a failed attempt and the next, in milliseconds
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Longest the dispatch loop waits before re-checking for free slots
    #[serde(rename = "progress-poll-interval-ms", default = "default_progress_poll_interval_ms")]
    pub progress_poll_interval_ms: u64,

    /// Optional limit on a single attempt, in milliseconds
    #[serde(rename = "attempt-timeout-ms", default)]
    pub attempt_timeout_ms: Option<u64>,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_progress_poll_interval_ms() -> u64 {
    100
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            progress_poll_interval_ms: default_progress_poll_interval_ms(),
            attempt_timeout_ms: None,
        }
    }
}

impl SchedulerConfig {
    /// Get the retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get the poll interval as a Duration
    pub fn progress_poll_interval(&self) -> Duration {
        Duration::from_millis(self.progress_poll_interval_ms)
    }

    /// Get the per-attempt timeout, if any
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }

    /// Reject values the scheduler cannot run with
    pub fn validate(&self) -> eyre::Result<()> {
        if self.max_concurrent == 0 {
            return Err(eyre::eyre!("max-concurrent must be at least 1"));
        }
        if self.progress_poll_interval_ms == 0 {
            return Err(eyre::eyre!("progress-poll-interval-ms must be at least 1"));
        }
        if self.attempt_timeout_ms == Some(0) {
            return Err(eyre::eyre!("attempt-timeout-ms must be at least 1 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.progress_poll_interval(), Duration::from_millis(100));
        assert_eq!(config.attempt_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = SchedulerConfig {
            max_concurrent: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let yaml = r#"
max-concurrent: 3
attempt-timeout-ms: 60000
"#;
        let config: SchedulerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.attempt_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_delay_ms, 1000);
    }
}
