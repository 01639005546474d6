use super::{
    errors::{panic_message, SpawnError},
    handle::{completion_pair, CompletionHandle},
    model::WorkItem,
    queue::WorkQueue,
    result::SpawnResult,
    worker::Worker,
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};


/// Конфигурация пула потоков
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub num_threads: usize,
    /// How long an idle worker sleeps before polling the queue again.
    pub idle_pause: Duration,
    pub thread_name: &'static str,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            idle_pause: Duration::from_millis(1),
            thread_name: "pool",
        }
    }
}

impl PoolConfig {
    pub fn named(thread_name: &'static str, num_threads: usize) -> Self {
        Self {
            num_threads,
            thread_name,
            ..Default::default()
        }
    }

    pub fn with_idle_pause(mut self, idle_pause: Duration) -> Self {
        self.idle_pause = idle_pause;
        self
    }
}


/// Anything that accepts a [`WorkItem`] and runs it on some thread later.
pub trait Executor: Send + Sync {
    /// Hands the item over without blocking. Fails with
    /// [`SpawnError::Rejected`] once the executor has been shut down.
    fn execute(&self, item: WorkItem) -> SpawnResult<()>;

    fn thread_count(&self) -> usize;

    fn is_active(&self) -> bool;

    /// Stops accepting new items; already accepted items still run.
    fn shutdown(&self);

    /// Runs `f` as item `index` and returns a handle on its outcome.
    ///
    /// A panic inside `f` is caught and resolves the handle with
    /// [`SpawnError::Panic`] instead of taking the worker down.
    fn spawn<T, F>(&self, index: usize, f: F) -> SpawnResult<CompletionHandle<T>>
    where
        Self: Sized,
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (completer, handle) = completion_pair();
        self.execute(WorkItem::new(index, move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f))
                .map_err(|payload| SpawnError::Panic(panic_message(payload)));
            completer.complete(result);
        }))?;
        Ok(handle)
    }
}


/// Fixed cohort of persistent threads draining one shared queue.
///
/// Shutdown is soft: it only stops acceptance. Whatever is already queued
/// is still executed by the workers on their own time.
pub struct FixedWorkerPool {
    config: PoolConfig,
    // Check-and-push in `submit` holds the read side, cancelling takes the
    // write side: once a worker sees the token cancelled, every accepted
    // item is already in the queue.
    gate: RwLock<()>,
    shutdown: CancellationToken,
    queue: Arc<WorkQueue>,
    workers: Vec<Worker>,
}

impl FixedWorkerPool {
    pub fn new(num_threads: usize) -> SpawnResult<Self> {
        Self::with_config(PoolConfig {
            num_threads,
            ..Default::default()
        })
    }

    pub fn with_config(config: PoolConfig) -> SpawnResult<Self> {
        if config.num_threads < 1 {
            return Err(SpawnError::InvalidThreadCount {
                stage: config.thread_name,
                count: config.num_threads,
            });
        }

        let shutdown = CancellationToken::new();
        let queue = Arc::new(WorkQueue::new());
        let mut workers = Vec::with_capacity(config.num_threads);

        for id in 0..config.num_threads {
            let spawned = Worker::spawn(
                id,
                config.thread_name,
                shutdown.clone(),
                queue.clone(),
                config.idle_pause,
            );
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Let the threads that did start wind down.
                    shutdown.cancel();
                    return Err(SpawnError::ThreadSpawn(e.to_string()));
                }
            }
        }

        debug!(pool = config.thread_name, threads = config.num_threads, "pool started");

        Ok(Self {
            config,
            gate: RwLock::new(()),
            shutdown,
            queue,
            workers,
        })
    }

    #[inline]
    pub fn submit(&self, item: WorkItem) -> SpawnResult<()> {
        let _accepting = self.gate.read();
        if self.shutdown.is_cancelled() {
            return Err(SpawnError::Rejected);
        }
        self.queue.push(item);
        Ok(())
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.config.thread_name
    }

    fn close(&self) {
        let _closing = self.gate.write();
        self.shutdown.cancel();
    }

    /// Items waiting in the queue right now.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Shuts down and waits for every worker to drain the queue and exit.
    /// Returns the total number of items the workers ran.
    pub fn await_termination(mut self) -> usize {
        self.close();
        let executed = std::mem::take(&mut self.workers)
            .into_iter()
            .map(|worker| {
                let id = worker.id();
                let ran = worker.join();
                trace!(pool = self.config.thread_name, worker = id, ran, "worker joined");
                ran
            })
            .sum();
        debug!(pool = self.config.thread_name, executed, "pool terminated");
        executed
    }
}

impl Executor for FixedWorkerPool {
    #[inline]
    fn execute(&self, item: WorkItem) -> SpawnResult<()> {
        self.submit(item)
    }

    #[inline]
    fn thread_count(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    fn is_active(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            debug!(pool = self.config.thread_name, queued = self.queued(), "pool shutting down");
            self.close();
        }
    }
}

impl Drop for FixedWorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}
