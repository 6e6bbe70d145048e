//! Engine trait definition

use async_trait::async_trait;

use super::EngineError;
use crate::domain::{Document, OperationKind, OperationOptions, OperationOutput};

/// Progress callback handed to the engine, taking values in [0, 100]
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// One job as the engine sees it: kind, inputs, options verbatim
#[derive(Debug, Clone, Copy)]
pub struct EngineJob<'a> {
    pub kind: OperationKind,
    pub inputs: &'a [Document],
    pub options: &'a OperationOptions,
}

/// The external document-processing engine
///
/// Capacity limited and shared; the scheduler's concurrency cap is the only
/// thing protecting it. Each call is independent.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Execute one job, optionally reporting progress along the way
    async fn execute(&self, job: EngineJob<'_>, progress: ProgressFn<'_>) -> Result<OperationOutput, EngineError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tracing::debug;

    /// Scripted engine for unit tests
    ///
    /// Pops one outcome per call; once the script runs out every call
    /// succeeds with the inputs echoed back.
    pub struct MockEngine {
        script: Mutex<VecDeque<Result<(), EngineError>>>,
        latency: Duration,
        call_count: AtomicUsize,
        progress_steps: Vec<f64>,
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                latency: Duration::ZERO,
                call_count: AtomicUsize::new(0),
                progress_steps: Vec::new(),
            }
        }

        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        pub fn with_script(self, script: Vec<Result<(), EngineError>>) -> Self {
            *self.script.lock().unwrap() = script.into();
            self
        }

        pub fn with_progress(mut self, steps: Vec<f64>) -> Self {
            self.progress_steps = steps;
            self
        }

        pub fn call_count(&self) -> usize {
            debug!("MockEngine::call_count: called");
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Engine for MockEngine {
        fn name(&self) -> &str {
            "mock"
        }

        async fn execute(&self, job: EngineJob<'_>, progress: ProgressFn<'_>) -> Result<OperationOutput, EngineError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            for step in &self.progress_steps {
                progress(*step);
            }
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            match next {
                Some(Err(err)) => Err(err),
                _ => Ok(OperationOutput::new(job.inputs.to_vec())),
            }
        }
    }
}
