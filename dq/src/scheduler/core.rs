//! Scheduler implementation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::domain::{NewOperation, Operation, OperationId, OperationOutput};
use crate::engine::{Engine, ExecutionAdapter, ExecutionError};

use super::config::SchedulerConfig;
use super::queue::{Membership, PendingQueue, QueueEntry, QueueEntryStatus, SchedulerStats};
use super::retry::{RetryDecision, RetryPolicy};
use super::status::QueueStatus;

/// An operation currently claimed by an execution task
struct InFlight {
    operation: Arc<Operation>,
    /// Failed attempts so far
    attempt: u32,
    dispatched_at: Instant,
}

/// Internal state protected by mutex
///
/// Every operation is in exactly one of `pending`, `in_flight`, `completed`
/// or `failed`. The lock is never held across an await point.
struct SchedulerState {
    pending: PendingQueue,
    in_flight: HashMap<OperationId, InFlight>,
    completed: Vec<Arc<Operation>>,
    failed: Vec<Arc<Operation>>,

    /// Terminal records whose hook has not returned yet
    finishing: usize,

    next_sequence: u64,
    paused: bool,

    /// Whether a dispatch loop task is alive
    dispatching: bool,

    stats: SchedulerStats,
}

struct Shared {
    config: SchedulerConfig,

    /// Runtime every scheduler task is spawned on, so callers on other
    /// threads can submit
    runtime: Handle,

    retry: RetryPolicy,
    adapter: ExecutionAdapter,
    state: Mutex<SchedulerState>,

    /// Wakes the dispatch loop when a slot frees up or work arrives
    wake: Notify,

    /// Wakes `wait_idle` callers when the loop goes idle
    idle: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // Critical sections never panic midway, so the sets stay consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The Scheduler admits document operations, runs them against the engine
/// under a concurrency cap, retries failures, and reports status.
///
/// Cloning is cheap and every clone drives the same queue. Create one at
/// startup and hand clones to whoever submits work. Once built, any thread
/// may submit, whether or not it runs inside Tokio.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    /// Create a new scheduler on the current Tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Use [`Scheduler::with_runtime`]
    /// to build one from a plain thread.
    pub fn new(config: SchedulerConfig, engine: Arc<dyn Engine>) -> Self {
        Self::with_runtime(config, engine, Handle::current())
    }

    /// Create a new scheduler whose tasks run on `runtime`
    pub fn with_runtime(mut config: SchedulerConfig, engine: Arc<dyn Engine>, runtime: Handle) -> Self {
        if config.max_concurrent == 0 {
            warn!("max-concurrent of 0 would never dispatch; using 1");
            config.max_concurrent = 1;
        }
        if config.progress_poll_interval_ms == 0 {
            warn!("progress-poll-interval-ms of 0 would spin the dispatch loop; using 1");
            config.progress_poll_interval_ms = 1;
        }

        let retry = RetryPolicy::from_config(&config);
        let adapter = ExecutionAdapter::new(engine, config.attempt_timeout());
        debug!(?config, engine = %adapter.engine_name(), "Scheduler::with_runtime: called");

        Self {
            shared: Arc::new(Shared {
                config,
                runtime,
                retry,
                adapter,
                state: Mutex::new(SchedulerState {
                    pending: PendingQueue::new(),
                    in_flight: HashMap::new(),
                    completed: Vec::new(),
                    failed: Vec::new(),
                    finishing: 0,
                    next_sequence: 0,
                    paused: false,
                    dispatching: false,
                    stats: SchedulerStats::default(),
                }),
                wake: Notify::new(),
                idle: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Submit an operation; returns its ID without waiting for execution
    pub fn submit(&self, new: NewOperation) -> OperationId {
        let id = OperationId::new();
        debug!(%id, kind = %new.kind(), priority = new.priority(), "Scheduler::submit: called");

        let mut state = self.shared.lock();
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let position = state.pending.insert(Arc::new(Operation::admit(new, id, sequence)));
        state.stats.total_submitted += 1;
        state.stats.peak_queue_depth = state.stats.peak_queue_depth.max(state.pending.len());
        debug!(%id, position, queued = state.pending.len(), "Scheduler::submit: queued");

        self.ensure_dispatching(state);
        id
    }

    /// Submit several operations in order; equivalent to repeated `submit`
    pub fn submit_many(&self, ops: impl IntoIterator<Item = NewOperation>) -> Vec<OperationId> {
        debug!("Scheduler::submit_many: called");
        ops.into_iter().map(|op| self.submit(op)).collect()
    }

    /// Resume dispatching after `pause`, starting the loop if it is idle
    pub fn start(&self) {
        debug!("Scheduler::start: called");
        let mut state = self.shared.lock();
        if state.paused {
            info!("Scheduler resumed");
        }
        state.paused = false;
        self.ensure_dispatching(state);
    }

    /// Stop admitting new work; in-flight operations run to completion
    pub fn pause(&self) {
        debug!("Scheduler::pause: called");
        let mut state = self.shared.lock();
        if !state.paused {
            info!(in_flight = state.in_flight.len(), queued = state.pending.len(), "Scheduler paused");
        }
        state.paused = true;
    }

    /// Drop every pending operation without firing hooks; returns how many
    pub fn clear(&self) -> usize {
        debug!("Scheduler::clear: called");
        let mut state = self.shared.lock();
        let dropped = state.pending.clear();
        state.stats.total_cleared += dropped as u64;
        drop(state);

        if dropped > 0 {
            info!(dropped, "Cleared pending operations");
        }
        self.shared.wake.notify_one();
        dropped
    }

    /// Counts per set
    pub fn status(&self) -> QueueStatus {
        let state = self.shared.lock();
        QueueStatus::new(
            state.pending.len(),
            state.in_flight.len(),
            state.completed.len(),
            state.failed.len(),
        )
    }

    /// Whole-percent share of operations in a terminal state (100 when empty)
    pub fn progress(&self) -> u8 {
        self.status().progress()
    }

    /// Which set an operation is currently in, if the scheduler knows it
    pub fn membership(&self, id: OperationId) -> Option<Membership> {
        let state = self.shared.lock();
        if state.in_flight.contains_key(&id) {
            Some(Membership::InFlight)
        } else if state.pending.contains(id) {
            Some(Membership::Pending)
        } else if state.completed.iter().any(|op| op.id() == id) {
            Some(Membership::Completed)
        } else if state.failed.iter().any(|op| op.id() == id) {
            Some(Membership::Failed)
        } else {
            None
        }
    }

    /// Running and queued operations, running first, queued in dispatch order
    pub fn queue_details(&self) -> Vec<QueueEntry> {
        debug!("Scheduler::queue_details: called");
        let state = self.shared.lock();
        let now = Instant::now();

        let mut running: Vec<QueueEntry> = state
            .in_flight
            .values()
            .map(|f| QueueEntry {
                id: f.operation.id(),
                kind: f.operation.kind(),
                priority: f.operation.priority(),
                status: QueueEntryStatus::Running,
                attempt: f.attempt,
                wait_time: now - f.dispatched_at,
            })
            .collect();
        running.sort_by_key(|e| std::cmp::Reverse(e.priority));

        running.extend(state.pending.iter().map(|op| QueueEntry {
            id: op.id(),
            kind: op.kind(),
            priority: op.priority(),
            status: QueueEntryStatus::Queued,
            attempt: 0,
            wait_time: now - op.submitted_at(),
        }));
        running
    }

    /// Completed operations, in completion order
    pub fn completed(&self) -> Vec<Arc<Operation>> {
        self.shared.lock().completed.clone()
    }

    /// Failed operations, in failure order
    pub fn failed(&self) -> Vec<Arc<Operation>> {
        self.shared.lock().failed.clone()
    }

    /// Get the scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        self.shared.lock().stats.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    /// No dispatch loop is running: nothing in flight, and nothing pending
    /// or paused
    pub fn is_idle(&self) -> bool {
        !self.shared.lock().dispatching
    }

    /// Wait until the scheduler goes idle
    pub async fn wait_idle(&self) {
        debug!("Scheduler::wait_idle: called");
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Spawn the dispatch loop if there is work and none is running,
    /// otherwise nudge the running one
    fn ensure_dispatching(&self, mut state: MutexGuard<'_, SchedulerState>) {
        if state.paused {
            debug!("Scheduler::ensure_dispatching: paused, not dispatching");
            return;
        }
        if state.dispatching {
            drop(state);
            self.shared.wake.notify_one();
            return;
        }
        if state.pending.is_empty() {
            return;
        }

        state.dispatching = true;
        drop(state);

        debug!("Scheduler::ensure_dispatching: spawning dispatch loop");
        self.shared.runtime.spawn(dispatch_loop(Arc::clone(&self.shared)));
    }
}

/// Admit pending operations while slots are free, then wait for a terminal
/// transition. Exits (goes idle) once nothing is in flight and nothing can
/// be admitted.
async fn dispatch_loop(shared: Arc<Shared>) {
    debug!("dispatch_loop: started");
    let max_concurrent = shared.config.max_concurrent;
    let poll_interval = shared.config.progress_poll_interval();

    loop {
        let claimed = {
            let mut state = shared.lock();
            let mut claimed = Vec::new();

            if !state.paused {
                while state.in_flight.len() < max_concurrent {
                    let Some(op) = state.pending.pop() else {
                        break;
                    };
                    state.in_flight.insert(
                        op.id(),
                        InFlight {
                            operation: Arc::clone(&op),
                            attempt: 0,
                            dispatched_at: Instant::now(),
                        },
                    );
                    state.stats.total_dispatched += 1;
                    state.stats.peak_concurrent = state.stats.peak_concurrent.max(state.in_flight.len());
                    claimed.push(op);
                }
            }

            if state.in_flight.is_empty() && state.finishing == 0 {
                state.dispatching = false;
                debug!(
                    queued = state.pending.len(),
                    paused = state.paused,
                    "dispatch_loop: nothing in flight, going idle"
                );
                drop(state);
                shared.idle.notify_waiters();
                return;
            }
            claimed
        };

        for op in claimed {
            debug!(id = %op.id(), kind = %op.kind(), priority = op.priority(), "dispatch_loop: dispatching");
            shared.runtime.spawn(execute_with_retry(Arc::clone(&shared), op));
        }

        // The notification is the real signal; the interval only bounds a single wait
        let _ = tokio::time::timeout(poll_interval, shared.wake.notified()).await;
    }
}

/// Run one claimed operation to a terminal state
async fn execute_with_retry(shared: Arc<Shared>, op: Arc<Operation>) {
    let id = op.id();
    let mut failed_attempts = 0u32;

    loop {
        match shared.adapter.execute(&op).await {
            Ok(output) => {
                finish(&shared, &op, Ok(output));
                return;
            }
            Err(err) => {
                failed_attempts += 1;
                match shared.retry.decide(failed_attempts) {
                    RetryDecision::Retry { after } => {
                        if !err.is_retryable() {
                            warn!(%id, error = %err, "Retrying an error that cannot succeed on retry");
                        }
                        debug!(%id, failed_attempts, ?after, error = %err, "execute_with_retry: retrying");
                        {
                            let mut state = shared.lock();
                            if let Some(entry) = state.in_flight.get_mut(&id) {
                                entry.attempt = failed_attempts;
                            }
                            state.stats.total_retries += 1;
                        }
                        if !after.is_zero() {
                            tokio::time::sleep(after).await;
                        }
                    }
                    RetryDecision::GiveUp => {
                        finish(&shared, &op, Err(err));
                        return;
                    }
                }
            }
        }
    }
}

/// Move an operation to its terminal set, then fire its hook
fn finish(shared: &Shared, op: &Arc<Operation>, outcome: Result<OperationOutput, ExecutionError>) {
    let id = op.id();
    {
        let mut state = shared.lock();
        state.in_flight.remove(&id);
        match &outcome {
            Ok(_) => {
                state.completed.push(Arc::clone(op));
                state.stats.total_completed += 1;
            }
            Err(_) => {
                state.failed.push(Arc::clone(op));
                state.stats.total_failed += 1;
            }
        }
        state.finishing += 1;
    }

    match &outcome {
        Ok(output) => {
            info!(%id, kind = %op.kind(), documents = output.documents.len(), "Operation completed");
            op.notify_complete(output);
        }
        Err(err) => {
            warn!(%id, kind = %op.kind(), error = %err, "Operation failed");
            op.notify_error(err);
        }
    }

    shared.lock().finishing -= 1;
    shared.wake.notify_one();
}
