//! docqueue configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::SimulatedEngineConfig;
use crate::scheduler::SchedulerConfig;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".docqueue.yml";

/// Main docqueue configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Admission, concurrency and retry settings
    pub scheduler: SchedulerConfig,

    /// Settings for the stand-in engine used by the CLI
    pub engine: SimulatedEngineConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate().context("Invalid scheduler configuration")?;
        self.engine.validate().context("Invalid engine configuration")?;
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// Explicit path, then `./.docqueue.yml`, then the user config
    /// directory, then built-in defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// `~/.config/docqueue/docqueue.yml` (platform equivalent)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docqueue").join("docqueue.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.scheduler.max_concurrent, 2);
        assert_eq!(config.scheduler.retry_attempts, 2);
        assert_eq!(config.engine.latency_ms, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
scheduler:
  max-concurrent: 3
  retry-attempts: 0
  retry-delay-ms: 250
  progress-poll-interval-ms: 50

engine:
  latency-ms: 10
  progress-steps: 1
  failure-rate: 0.25
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.scheduler.max_concurrent, 3);
        assert_eq!(config.scheduler.retry_attempts, 0);
        assert_eq!(config.scheduler.retry_delay_ms, 250);
        assert_eq!(config.scheduler.progress_poll_interval_ms, 50);
        assert_eq!(config.engine.latency_ms, 10);
        assert_eq!(config.engine.failure_rate, 0.25);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
scheduler:
  max-concurrent: 1
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.scheduler.max_concurrent, 1);

        // Defaults for unspecified
        assert_eq!(config.scheduler.retry_delay_ms, 1000);
        assert_eq!(config.engine, SimulatedEngineConfig::default());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "scheduler:\n  max-concurrent: 5").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.scheduler.max_concurrent, 5);
    }

    #[test]
    fn test_load_explicit_path_must_exist() {
        let missing = PathBuf::from("/nonexistent/docqueue.yml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/docqueue.yml"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.scheduler.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.failure_rate = -0.1;
        assert!(config.validate().is_err());
    }
}
