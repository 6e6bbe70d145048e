//! Operation records and observer hooks

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::document::{Document, OperationOutput};
use super::error::OperationError;
use super::id::OperationId;
use super::kind::OperationKind;
use super::options::OperationOptions;
use crate::engine::ExecutionError;

/// Called with a progress value in [0, 100] zero or more times per attempt
pub type ProgressHook = Arc<dyn Fn(f64, &Operation) + Send + Sync>;

/// Called once when the operation completes
pub type CompleteHook = Arc<dyn Fn(&OperationOutput, &Operation) + Send + Sync>;

/// Called once when the operation fails for the last time
pub type ErrorHook = Arc<dyn Fn(&ExecutionError, &Operation) + Send + Sync>;

/// Observer callbacks attached to an operation
#[derive(Clone, Default)]
pub struct Hooks {
    on_progress: Option<ProgressHook>,
    on_complete: Option<CompleteHook>,
    on_error: Option<ErrorHook>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// An operation as submitted by a caller, before it has an ID
///
/// Built from typed options, which are validated here. Input cardinality
/// is deliberately left unchecked; the execution adapter reports it.
#[derive(Debug, Clone)]
pub struct NewOperation {
    options: OperationOptions,
    inputs: Vec<Document>,
    priority: i32,
    hooks: Hooks,
}

impl NewOperation {
    /// Start building an operation from its options
    pub fn new(options: OperationOptions) -> Result<Self, OperationError> {
        debug!(kind = %options.kind(), "NewOperation::new: called");
        options.validate()?;
        Ok(Self {
            options,
            inputs: Vec::new(),
            priority: 0,
            hooks: Hooks::default(),
        })
    }

    /// Build an operation with default options for `kind`
    ///
    /// Fails for kinds whose defaults are incomplete (watermark, extract,
    /// reorder, encrypt).
    pub fn with_defaults(kind: OperationKind) -> Result<Self, OperationError> {
        Self::new(OperationOptions::defaults_for(kind))
    }

    pub fn with_input(mut self, document: Document) -> Self {
        self.inputs.push(document);
        self
    }

    pub fn with_inputs(mut self, documents: impl IntoIterator<Item = Document>) -> Self {
        self.inputs.extend(documents);
        self
    }

    /// Higher values dispatch earlier; equal values dispatch in submission order
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_progress<F>(mut self, hook: F) -> Self
    where
        F: Fn(f64, &Operation) + Send + Sync + 'static,
    {
        self.hooks.on_progress = Some(Arc::new(hook));
        self
    }

    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&OperationOutput, &Operation) + Send + Sync + 'static,
    {
        self.hooks.on_complete = Some(Arc::new(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExecutionError, &Operation) + Send + Sync + 'static,
    {
        self.hooks.on_error = Some(Arc::new(hook));
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.options.kind()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn inputs(&self) -> &[Document] {
        &self.inputs
    }
}

/// A submitted operation
///
/// Owned by the scheduler until it reaches a terminal state, after which it
/// is kept as a read-only history entry.
pub struct Operation {
    id: OperationId,
    sequence: u64,
    options: OperationOptions,
    inputs: Vec<Document>,
    priority: i32,
    hooks: Hooks,
    submitted_at: Instant,
}

impl Operation {
    pub(crate) fn admit(new: NewOperation, id: OperationId, sequence: u64) -> Self {
        Self {
            id,
            sequence,
            options: new.options,
            inputs: new.inputs,
            priority: new.priority,
            hooks: new.hooks,
            submitted_at: Instant::now(),
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.options.kind()
    }

    pub fn options(&self) -> &OperationOptions {
        &self.options
    }

    pub fn inputs(&self) -> &[Document] {
        &self.inputs
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Submission order within the owning scheduler
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    /// Forward an engine progress value to the progress hook, clamped to [0, 100]
    pub(crate) fn report_progress(&self, value: f64) {
        if value.is_nan() {
            debug!(id = %self.id, "Operation::report_progress: ignoring NaN");
            return;
        }
        if let Some(hook) = &self.hooks.on_progress {
            let value = value.clamp(0.0, 100.0);
            self.guarded("on_progress", || hook(value, self));
        }
    }

    pub(crate) fn notify_complete(&self, output: &OperationOutput) {
        if let Some(hook) = &self.hooks.on_complete {
            self.guarded("on_complete", || hook(output, self));
        }
    }

    pub(crate) fn notify_error(&self, error: &ExecutionError) {
        if let Some(hook) = &self.hooks.on_error {
            self.guarded("on_error", || hook(error, self));
        }
    }

    /// A panicking hook must not take the executing task down with it
    fn guarded(&self, hook: &str, f: impl FnOnce()) {
        if catch_unwind(AssertUnwindSafe(f)).is_err() {
            warn!(id = %self.id, %hook, "Operation hook panicked");
        }
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("inputs", &self.inputs)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::{RotateOptions, SplitOptions};
    use std::sync::Mutex;

    fn split() -> NewOperation {
        NewOperation::new(OperationOptions::Split(SplitOptions::default())).unwrap()
    }

    #[test]
    fn test_builder_collects_inputs_and_priority() {
        let new = split()
            .with_input(Document::new("a.pdf", vec![1u8]))
            .with_inputs(vec![Document::new("b.pdf", vec![2u8])])
            .with_priority(-3);

        assert_eq!(new.kind(), OperationKind::Split);
        assert_eq!(new.priority(), -3);
        assert_eq!(new.inputs().len(), 2);
    }

    #[test]
    fn test_builder_rejects_invalid_options() {
        let result = NewOperation::new(OperationOptions::Rotate(RotateOptions {
            degrees: 30,
            pages: vec![],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_is_clamped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let new = split().on_progress(move |value, _| sink.lock().unwrap().push(value));
        let op = Operation::admit(new, OperationId::new(), 0);

        op.report_progress(-5.0);
        op.report_progress(42.5);
        op.report_progress(250.0);
        op.report_progress(f64::NAN);

        assert_eq!(*seen.lock().unwrap(), vec![0.0, 42.5, 100.0]);
    }

    #[test]
    fn test_panicking_hook_is_contained() {
        let new = split().on_complete(|_, _| panic!("boom"));
        let op = Operation::admit(new, OperationId::new(), 0);

        op.notify_complete(&OperationOutput::default());
    }

    #[test]
    fn test_hooks_receive_record() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let new = split().with_priority(9).on_error(move |err, op| {
            *sink.lock().unwrap() = Some((err.to_string(), op.priority()));
        });
        let op = Operation::admit(new, OperationId::new(), 4);

        op.notify_error(&ExecutionError::Panicked("engine died".to_string()));

        let (msg, priority) = seen.lock().unwrap().clone().unwrap();
        assert!(msg.contains("engine died"));
        assert_eq!(priority, 9);
        assert_eq!(op.sequence(), 4);
    }
}
