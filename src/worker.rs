//! Fixed-size thread pool for independent tasks.
//!
//! Not used by the generation path, which is sequential per table. Tasks get
//! the pool's [`CancelToken`] and should return early once it is set.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub type TaskError = Box<dyn std::error::Error + Send + Sync>;
pub type Task = Box<dyn FnOnce(&CancelToken) -> Result<(), TaskError> + Send>;

/// What a failed task does to the rest of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Cancel the pool on the first failure; queued tasks are skipped.
    #[default]
    AbortOnError,
    ContinueOnError,
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Totals reported once the pool is drained
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    /// Tasks dequeued after cancellation and never run
    pub skipped: u64,
    pub elapsed: Duration,
    pub errors: Vec<String>,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    errors: Mutex<Vec<String>>,
}

pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
    token: CancelToken,
    started: Instant,
}

impl WorkerPool {
    /// Start `workers` threads (0 means one per available CPU).
    pub fn new(workers: usize, policy: ErrorPolicy) -> Self {
        let workers = if workers == 0 {
            thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            workers
        };

        let (sender, receiver) = mpsc::channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(Counters::default());
        let token = CancelToken::default();

        let handles = (0..workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let counters = Arc::clone(&counters);
                let token = token.clone();
                thread::spawn(move || worker_loop(id, &receiver, &counters, &token, policy))
            })
            .collect();

        debug!(workers, ?policy, "worker pool started");
        Self {
            sender: Some(sender),
            handles,
            counters,
            token,
            started: Instant::now(),
        }
    }

    /// Queue a task. Returns false (and drops the task) once cancelled.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce(&CancelToken) -> Result<(), TaskError> + Send + 'static,
    {
        if self.token.is_cancelled() {
            return false;
        }
        let Some(ref sender) = self.sender else {
            return false;
        };
        if sender.send(Box::new(task)).is_err() {
            return false;
        }
        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        true
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Close the queue, wait for the workers and return the totals.
    pub fn drain(mut self) -> PoolStats {
        drop(self.sender.take());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        let errors = self
            .counters
            .errors
            .lock()
            .map(|e| e.clone())
            .unwrap_or_else(|e| e.into_inner().clone());
        PoolStats {
            submitted: self.counters.submitted.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            skipped: self.counters.skipped.load(Ordering::SeqCst),
            elapsed: self.started.elapsed(),
            errors,
        }
    }
}

fn worker_loop(
    id: usize,
    receiver: &Mutex<Receiver<Task>>,
    counters: &Counters,
    token: &CancelToken,
    policy: ErrorPolicy,
) {
    loop {
        let next = match receiver.lock() {
            Ok(rx) => rx.recv(),
            Err(poisoned) => poisoned.into_inner().recv(),
        };
        let Ok(task) = next else {
            break;
        };

        if token.is_cancelled() {
            counters.skipped.fetch_add(1, Ordering::SeqCst);
            continue;
        }

        match task(token) {
            Ok(()) => {
                counters.completed.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                warn!(worker = id, error = %e, "task failed");
                counters.failed.fetch_add(1, Ordering::SeqCst);
                if let Ok(mut errors) = counters.errors.lock() {
                    errors.push(e.to_string());
                }
                if policy == ErrorPolicy::AbortOnError {
                    token.cancel();
                }
            }
        }
    }
}
