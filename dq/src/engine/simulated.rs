//! Simulated engine
//!
//! Stands in for the real document engine so the scheduler can run end to
//! end. It transforms nothing: after a configurable delay it echoes the
//! inputs back (merge concatenates them), optionally failing at random.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Engine, EngineError, EngineJob, ProgressFn};
use crate::domain::{Document, OperationKind, OperationOutput};

/// Simulated engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedEngineConfig {
    /// Time each job takes, in milliseconds
    #[serde(rename = "latency-ms")]
    pub latency_ms: u64,

    /// Number of progress reports per job
    #[serde(rename = "progress-steps")]
    pub progress_steps: u32,

    /// Probability in [0, 1] that a job fails
    #[serde(rename = "failure-rate")]
    pub failure_rate: f64,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            latency_ms: 250,
            progress_steps: 4,
            failure_rate: 0.0,
        }
    }
}

impl SimulatedEngineConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(eyre::eyre!(
                "engine failure-rate must be within 0.0..=1.0, got {}",
                self.failure_rate
            ));
        }
        Ok(())
    }
}

/// Engine that simulates latency, progress and failures
pub struct SimulatedEngine {
    config: SimulatedEngineConfig,
}

impl SimulatedEngine {
    pub fn new(config: SimulatedEngineConfig) -> Self {
        debug!(?config, "SimulatedEngine::new: called");
        Self { config }
    }

    fn produce(job: &EngineJob<'_>) -> OperationOutput {
        match job.kind {
            OperationKind::Merge => {
                let data: Vec<u8> = job.inputs.iter().flat_map(|d| d.bytes().iter().copied()).collect();
                OperationOutput::single(Document::new("merged.pdf", data))
            }
            kind => OperationOutput::new(
                job.inputs
                    .iter()
                    .map(|d| Document::new(format!("{}-{}", kind, d.name()), d.bytes().to_vec()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Engine for SimulatedEngine {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn execute(&self, job: EngineJob<'_>, progress: ProgressFn<'_>) -> Result<OperationOutput, EngineError> {
        debug!(kind = %job.kind, inputs = job.inputs.len(), "SimulatedEngine::execute: called");
        let steps = self.config.progress_steps.max(1);
        let step_delay = self.config.latency() / steps;

        for step in 1..=steps {
            tokio::time::sleep(step_delay).await;
            if self.config.progress_steps > 0 {
                progress(f64::from(step) * 100.0 / f64::from(steps));
            }
        }

        if self.config.failure_rate > 0.0 && rand::random::<f64>() < self.config.failure_rate {
            debug!(kind = %job.kind, "SimulatedEngine::execute: injecting failure");
            return Err(EngineError::Internal("simulated engine fault".to_string()));
        }

        Ok(Self::produce(&job))
    }
}
