//! Where effect tasks run.
//!
//! Service calls never run on the thread that owns the workspace. A
//! [`Spawner`] accepts boxed tasks; each task posts its result back as a
//! message.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{unbounded, Sender};

/// A unit of background work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks somewhere other than the caller's stack.
pub trait Spawner: Send + Sync {
    fn spawn(&self, task: Task);
}

// =============================================================================
// ThreadPoolSpawner
// =============================================================================

/// Fixed-size pool of worker threads sharing one task queue.
pub struct ThreadPoolSpawner {
    tx: Sender<Task>,
    _threads: Vec<thread::JoinHandle<()>>,
}

impl ThreadPoolSpawner {
    pub fn new(threads: usize) -> Self {
        let (tx, rx) = unbounded::<Task>();

        let mut worker_threads = Vec::with_capacity(threads);
        for index in 0..threads.max(1) {
            let rx = rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("workbench-worker-{index}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        task();
                    }
                });
            match spawned {
                Ok(handle) => worker_threads.push(handle),
                Err(err) => tracing::warn!(%err, "failed to start worker thread"),
            }
        }

        Self {
            tx,
            _threads: worker_threads,
        }
    }
}

impl Default for ThreadPoolSpawner {
    fn default() -> Self {
        Self::new(default_worker_threads())
    }
}

impl Spawner for ThreadPoolSpawner {
    fn spawn(&self, task: Task) {
        let _ = self.tx.send(task);
    }
}

fn default_worker_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .clamp(2, 8)
}

// =============================================================================
// ManualSpawner
// =============================================================================

/// Queues tasks until the host runs them.
///
/// Cloning shares the queue, so a test can keep one handle while the
/// workspace owns another.
#[derive(Clone, Default)]
pub struct ManualSpawner {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl ManualSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Runs queued tasks, including any they queue, until the queue is
    /// empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Runs only the oldest queued task.
    pub fn run_next(&self) -> bool {
        let task = self.lock().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Spawner for ManualSpawner {
    fn spawn(&self, task: Task) {
        self.lock().push_back(task);
    }
}
