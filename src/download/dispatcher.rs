//! Concurrent dispatcher executing a finite task list with bounded parallelism.
//!
//! # Concurrency Model
//!
//! - A bounded task channel feeds a fixed number of worker slots
//! - Each slot runs in its own Tokio task and executes one task at a time
//! - After every execution the slot sleeps for the pacing delay before
//!   pulling its next task, on every exit path of the execution
//! - Outcomes travel over a second channel to a single aggregation point
//! - The report is built only after every slot has been joined
//!
//! Individual task failures, including panics inside an executor, become
//! [`Outcome::Failure`] entries and never abort the batch.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::DownloadError;
use crate::task::{Outcome, Task};

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 256;

/// Default worker count if not specified.
pub const DEFAULT_WORKERS: usize = 32;

/// Default pacing delay per worker slot.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);

/// Error type for dispatcher construction.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Executes one task. Implemented by the fetch-extract worker and by test doubles.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Runs `task` to completion.
    ///
    /// # Errors
    ///
    /// Any error marks the task as failed; it is not retried.
    async fn execute(&self, task: &Task) -> Result<(), DownloadError>;
}

/// Receives one notification per collected outcome.
pub trait ProgressObserver: Send + Sync {
    /// Called from the aggregation point after `completed` of `total` tasks finished.
    fn on_outcome(&self, completed: usize, total: usize, outcome: &Outcome);
}

/// Observer that ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_outcome(&self, _completed: usize, _total: usize, _outcome: &Outcome) {}
}

/// Aggregated result of one dispatcher run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    total: usize,
    succeeded: usize,
    failures: Vec<String>,
}

impl DispatchReport {
    /// Number of tasks submitted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of [`Outcome::Success`] results.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of [`Outcome::Failure`] results.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Failed URLs in the order their outcomes were collected.
    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::Failure { source_url } => self.failures.push(source_url),
        }
    }
}

/// Bounded worker pool for a known list of tasks.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use whalesounds_core::download::{
///     ArchiveMode, Dispatcher, FetchExtractWorker, HttpClient, NoProgress,
/// };
/// use whalesounds_core::Task;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let worker = FetchExtractWorker::new(HttpClient::new(), "./out", ArchiveMode::Extract);
/// let dispatcher = Dispatcher::new(4, Duration::from_millis(500))?;
/// let tasks = vec![Task::new("http://cis.whoi.edu/data/tape1.zip", "BlueWhale")];
/// let report = dispatcher.run(tasks, Arc::new(worker), &NoProgress).await;
/// println!("{} of {} failed", report.failed(), report.total());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    workers: usize,
    wait: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher with `workers` slots and a per-slot pacing delay.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidWorkers`] if `workers` is outside
    /// the valid range (1-256).
    #[instrument(level = "debug")]
    pub fn new(workers: usize, wait: Duration) -> Result<Self, DispatchError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(DispatchError::InvalidWorkers { value: workers });
        }
        debug!(workers, wait_ms = wait.as_millis(), "creating dispatcher");
        Ok(Self { workers, wait })
    }

    /// Returns the configured worker bound.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the configured pacing delay.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Executes every task and returns once each one has produced an outcome.
    ///
    /// At most [`workers`](Self::workers) executions are in flight at once.
    /// Outcome order is not significant.
    #[instrument(skip_all, fields(tasks = tasks.len(), workers = self.workers))]
    pub async fn run(
        &self,
        tasks: Vec<Task>,
        executor: Arc<dyn TaskExecutor>,
        observer: &dyn ProgressObserver,
    ) -> DispatchReport {
        let total = tasks.len();
        let mut report = DispatchReport {
            total,
            ..DispatchReport::default()
        };
        if total == 0 {
            info!("no tasks to dispatch");
            return report;
        }

        let (task_tx, task_rx) = mpsc::channel::<Task>(self.workers);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();

        let mut slots = JoinSet::new();
        for slot in 0..self.workers.min(total) {
            slots.spawn(run_slot(
                slot,
                Arc::clone(&task_rx),
                Arc::clone(&executor),
                outcome_tx.clone(),
                self.wait,
            ));
        }
        // Slots hold the remaining handles; the outcome stream ends when the last slot exits.
        drop(outcome_tx);
        drop(task_rx);

        let feed = async move {
            let mut unsent = Vec::new();
            let mut pending = tasks.into_iter();
            for task in pending.by_ref() {
                if let Err(mpsc::error::SendError(task)) = task_tx.send(task).await {
                    unsent.push(task);
                    break;
                }
            }
            unsent.extend(pending);
            unsent
        };

        let collect = async {
            let mut collected = Vec::with_capacity(total);
            while let Some(outcome) = outcome_rx.recv().await {
                observer.on_outcome(collected.len() + 1, total, &outcome);
                collected.push(outcome);
            }
            collected
        };

        let (unsent, collected) = tokio::join!(feed, collect);

        while let Some(joined) = slots.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "worker slot terminated abnormally");
            }
        }

        for outcome in collected {
            report.record(outcome);
        }
        for task in unsent {
            error!(url = %task.source_url, "task was never executed");
            report.record(Outcome::Failure {
                source_url: task.source_url,
            });
        }

        info!(
            total = report.total(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "dispatch complete"
        );
        report
    }
}

/// One worker slot: pull, execute, pace, repeat until the task channel closes.
async fn run_slot(
    slot: usize,
    tasks: Arc<Mutex<mpsc::Receiver<Task>>>,
    executor: Arc<dyn TaskExecutor>,
    outcomes: mpsc::UnboundedSender<Outcome>,
    wait: Duration,
) {
    debug!(slot, "worker slot started");
    loop {
        // Idle slots queue on the lock; the holder waits for the next task and
        // releases the guard before executing it.
        let next = {
            let mut rx = tasks.lock().await;
            rx.recv().await
        };
        let Some(task) = next else {
            break;
        };

        let outcome = paced(wait, execute_guarded(executor.as_ref(), &task)).await;

        if outcomes.send(outcome).is_err() {
            warn!(slot, "outcome receiver dropped; stopping slot");
            break;
        }
    }
    debug!(slot, "worker slot finished");
}

/// Awaits `execution`, then the pacing delay, regardless of what the execution produced.
///
/// `execution` must not unwind; [`execute_guarded`] guarantees that.
async fn paced<F>(wait: Duration, execution: F) -> Outcome
where
    F: Future<Output = Outcome>,
{
    let outcome = execution.await;
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }
    outcome
}

/// Runs one task, downgrading errors and panics to [`Outcome::Failure`].
async fn execute_guarded(executor: &dyn TaskExecutor, task: &Task) -> Outcome {
    match AssertUnwindSafe(executor.execute(task)).catch_unwind().await {
        Ok(Ok(())) => Outcome::Success,
        Ok(Err(e)) => {
            warn!(url = %task.source_url, group = %task.group_name, error = %e, "task failed");
            Outcome::Failure {
                source_url: task.source_url.clone(),
            }
        }
        Err(payload) => {
            error!(
                url = %task.source_url,
                panic = panic_message(payload.as_ref()),
                "task panicked"
            );
            Outcome::Failure {
                source_url: task.source_url.clone(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Succeeds;

    #[async_trait]
    impl TaskExecutor for Succeeds {
        async fn execute(&self, _task: &Task) -> Result<(), DownloadError> {
            Ok(())
        }
    }

    struct Panics;

    #[async_trait]
    impl TaskExecutor for Panics {
        async fn execute(&self, task: &Task) -> Result<(), DownloadError> {
            if task.source_url.ends_with("boom") {
                panic!("simulated executor panic");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        last_total: AtomicUsize,
    }

    impl ProgressObserver for Counting {
        fn on_outcome(&self, completed: usize, total: usize, _outcome: &Outcome) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_total.store(total, Ordering::SeqCst);
            assert!(completed <= total);
        }
    }

    fn tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| Task::new(format!("http://cis.whoi.edu/data/{i}.zip"), "BlueWhale"))
            .collect()
    }

    #[test]
    fn test_dispatcher_new_valid_workers() {
        assert_eq!(Dispatcher::new(1, Duration::ZERO).unwrap().workers(), 1);
        assert_eq!(Dispatcher::new(32, Duration::ZERO).unwrap().workers(), 32);
        assert_eq!(Dispatcher::new(256, Duration::ZERO).unwrap().workers(), 256);
    }

    #[test]
    fn test_dispatcher_new_rejects_zero_workers() {
        let result = Dispatcher::new(0, Duration::ZERO);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidWorkers { value: 0 })
        ));
    }

    #[test]
    fn test_dispatcher_new_rejects_too_many_workers() {
        let result = Dispatcher::new(257, Duration::ZERO);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidWorkers { value: 257 })
        ));
    }

    #[test]
    fn test_dispatch_error_display() {
        let msg = DispatchError::InvalidWorkers { value: 0 }.to_string();
        assert!(msg.contains("invalid worker count"));
        assert!(msg.contains("256"));
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_WORKERS, 32);
        assert_eq!(DEFAULT_WAIT, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_run_empty_task_list_returns_empty_report() {
        let dispatcher = Dispatcher::new(4, Duration::ZERO).unwrap();
        let report = dispatcher
            .run(Vec::new(), Arc::new(Succeeds), &NoProgress)
            .await;
        assert_eq!(report, DispatchReport::default());
    }

    #[tokio::test]
    async fn test_run_reports_progress_once_per_task() {
        let dispatcher = Dispatcher::new(3, Duration::ZERO).unwrap();
        let observer = Counting::default();

        let report = dispatcher.run(tasks(10), Arc::new(Succeeds), &observer).await;

        assert_eq!(report.succeeded(), 10);
        assert_eq!(observer.calls.load(Ordering::SeqCst), 10);
        assert_eq!(observer.last_total.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_run_converts_panics_to_failures() {
        let dispatcher = Dispatcher::new(2, Duration::ZERO).unwrap();
        let mut list = tasks(3);
        list.push(Task::new("http://cis.whoi.edu/data/boom", "BlueWhale"));

        let report = dispatcher.run(list, Arc::new(Panics), &NoProgress).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failures(), ["http://cis.whoi.edu/data/boom"]);
    }

    #[tokio::test]
    async fn test_paced_sleeps_after_execution() {
        let start = tokio::time::Instant::now();
        let outcome = paced(Duration::from_millis(50), async { Outcome::Success }).await;
        assert!(outcome.is_success());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_panic_message_extracts_strings() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
