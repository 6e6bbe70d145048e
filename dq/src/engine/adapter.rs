//! Execution adapter: one operation attempt against the engine

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::debug;

use super::{Engine, EngineJob, ExecutionError};
use crate::domain::{Operation, OperationKind, OperationOutput};

/// Check that `count` inputs satisfy the cardinality `kind` requires
pub fn check_cardinality(kind: OperationKind, count: usize) -> Result<(), ExecutionError> {
    let expected = kind.cardinality();
    if expected.accepts(count) {
        Ok(())
    } else {
        Err(ExecutionError::Cardinality {
            kind,
            expected,
            actual: count,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Translates operations into engine calls
///
/// Every failure mode of a single attempt (contract violation, engine error,
/// timeout, panic) comes back as an [`ExecutionError`]. Retrying is the
/// scheduler's business, not the adapter's.
#[derive(Clone)]
pub struct ExecutionAdapter {
    engine: Arc<dyn Engine>,
    attempt_timeout: Option<Duration>,
}

impl ExecutionAdapter {
    pub fn new(engine: Arc<dyn Engine>, attempt_timeout: Option<Duration>) -> Self {
        debug!(engine = %engine.name(), ?attempt_timeout, "ExecutionAdapter::new: called");
        Self {
            engine,
            attempt_timeout,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Run one attempt of `operation`
    pub async fn execute(&self, operation: &Operation) -> Result<OperationOutput, ExecutionError> {
        let kind = operation.kind();
        debug!(id = %operation.id(), %kind, inputs = operation.inputs().len(), "ExecutionAdapter::execute: called");

        check_cardinality(kind, operation.inputs().len())?;

        let job = EngineJob {
            kind,
            inputs: operation.inputs(),
            options: operation.options(),
        };
        let progress = |value: f64| operation.report_progress(value);
        let call = AssertUnwindSafe(self.engine.execute(job, &progress)).catch_unwind();

        let outcome = match self.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    debug!(id = %operation.id(), ?limit, "ExecutionAdapter::execute: attempt timed out");
                    return Err(ExecutionError::Timeout(limit));
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(result) => {
                debug!(id = %operation.id(), ok = result.is_ok(), "ExecutionAdapter::execute: engine returned");
                result.map_err(ExecutionError::from)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                debug!(id = %operation.id(), %message, "ExecutionAdapter::execute: engine panicked");
                Err(ExecutionError::Panicked(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, NewOperation, OperationId, OperationOptions};
    use crate::engine::mock::MockEngine;
    use crate::engine::{EngineError, ProgressFn};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn operation(kind: OperationKind, inputs: usize) -> Operation {
        let new = NewOperation::new(OperationOptions::defaults_for(kind))
            .unwrap()
            .with_inputs((0..inputs).map(|i| Document::new(format!("{}.pdf", i), vec![i as u8])));
        Operation::admit(new, OperationId::new(), 0)
    }

    struct PanickingEngine;

    #[async_trait]
    impl Engine for PanickingEngine {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn execute(&self, _job: EngineJob<'_>, _progress: ProgressFn<'_>) -> Result<OperationOutput, EngineError> {
            panic!("renderer exploded");
        }
    }

    #[test]
    fn test_check_cardinality() {
        assert!(check_cardinality(OperationKind::Merge, 3).is_ok());
        assert!(check_cardinality(OperationKind::Merge, 0).is_err());
        assert!(check_cardinality(OperationKind::Split, 1).is_ok());
        assert!(matches!(
            check_cardinality(OperationKind::Split, 2),
            Err(ExecutionError::Cardinality { actual: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_cardinality_checked_before_engine() {
        let engine = Arc::new(MockEngine::new());
        let adapter = ExecutionAdapter::new(engine.clone(), None);

        let err = adapter.execute(&operation(OperationKind::Split, 2)).await.unwrap_err();

        assert!(err.is_cardinality());
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_multi_input_kinds_pass_all_inputs() {
        let engine = Arc::new(MockEngine::new());
        let adapter = ExecutionAdapter::new(engine.clone(), None);

        let output = adapter.execute(&operation(OperationKind::Compress, 3)).await.unwrap();

        assert_eq!(output.documents.len(), 3);
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn test_engine_error_surfaces() {
        let engine = Arc::new(MockEngine::new().with_script(vec![Err(EngineError::Internal("oom".to_string()))]));
        let adapter = ExecutionAdapter::new(engine, None);

        let err = adapter.execute(&operation(OperationKind::Merge, 2)).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Engine(EngineError::Internal(_))));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let adapter = ExecutionAdapter::new(Arc::new(PanickingEngine), None);

        let err = adapter.execute(&operation(OperationKind::Rotate, 1)).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Panicked(ref msg) if msg.contains("renderer exploded")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout() {
        let engine = Arc::new(MockEngine::new().with_latency(Duration::from_secs(10)));
        let adapter = ExecutionAdapter::new(engine, Some(Duration::from_secs(1)));

        let err = adapter.execute(&operation(OperationKind::Merge, 1)).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Timeout(limit) if limit == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_progress_forwarded_and_clamped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let new = NewOperation::new(OperationOptions::defaults_for(OperationKind::Merge))
            .unwrap()
            .with_input(Document::new("a.pdf", vec![0u8]))
            .on_progress(move |value, _| sink.lock().unwrap().push(value));
        let op = Operation::admit(new, OperationId::new(), 0);

        let engine = Arc::new(MockEngine::new().with_progress(vec![10.0, 55.5, 140.0]));
        let adapter = ExecutionAdapter::new(engine, None);
        adapter.execute(&op).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![10.0, 55.5, 100.0]);
    }
}
