use super::{
    errors::SpawnError,
    model::WorkItem,
    pool::Executor,
    result::SpawnResult,
};
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::debug;


/// Эталон: стандартный пул блокирующих потоков tokio.
///
/// Items go through `spawn_blocking` on a dedicated runtime whose blocking
/// pool is capped at `num_threads`, so it competes on equal thread counts.
pub struct BaselineExecutor {
    runtime: Runtime,
    num_threads: usize,
    shutdown: CancellationToken,
}

impl BaselineExecutor {
    pub fn new(num_threads: usize) -> SpawnResult<Self> {
        if num_threads < 1 {
            return Err(SpawnError::InvalidThreadCount {
                stage: "baseline",
                count: num_threads,
            });
        }

        // Items only ever run on the blocking pool; one async worker is
        // enough to drive the runtime.
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(num_threads)
            .thread_name("baseline")
            .enable_all()
            .build()
            .map_err(|e| SpawnError::ThreadSpawn(e.to_string()))?;

        debug!(threads = num_threads, "baseline runtime started");

        Ok(Self {
            runtime,
            num_threads,
            shutdown: CancellationToken::new(),
        })
    }
}

impl Executor for BaselineExecutor {
    fn execute(&self, item: WorkItem) -> SpawnResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(SpawnError::Rejected);
        }
        // The returned JoinHandle is not needed: outcomes travel through the
        // item's own completion channel.
        drop(self.runtime.spawn_blocking(move || item.run()));
        Ok(())
    }

    #[inline]
    fn thread_count(&self) -> usize {
        self.num_threads
    }

    #[inline]
    fn is_active(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    fn shutdown(&self) {
        self.shutdown.cancel();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn at_most_n_items_run_at_once() {
        let executor = BaselineExecutor::new(2).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (running, peak) = (running.clone(), peak.clone());
                executor
                    .spawn(i, move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        running.fetch_sub(1, Ordering::SeqCst);
                    })
                    .unwrap()
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(executor.thread_count(), 2);
    }
}
