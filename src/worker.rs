use super::{
    errors::panic_message,
    queue::WorkQueue,
};
use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
    time::Duration,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};


/// A persistent pool thread.
///
/// The thread sees only the shutdown token and the queue, never the pool.
pub struct Worker {
    id: usize,
    thread: thread::JoinHandle<usize>,
}

impl Worker {
    pub(crate) fn spawn(
        id: usize,
        name: &str,
        shutdown: CancellationToken,
        queue: Arc<WorkQueue>,
        idle_pause: Duration,
    ) -> io::Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("{}-{}", name, id))
            .spawn(move || run_loop(id, &shutdown, &queue, idle_pause))?;

        Ok(Self { id, thread })
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Waits for the loop to stop; returns how many items this worker ran.
    pub(crate) fn join(self) -> usize {
        self.thread.join().unwrap_or_default()
    }
}

// RUNNING and DRAINING share this body: keep going while the pool is active or
// anything is still queued. Emptiness is advisory since every worker races on
// the same queue, so a worker may pause and recheck once more near the end.
fn run_loop(
    id: usize,
    shutdown: &CancellationToken,
    queue: &WorkQueue,
    idle_pause: Duration,
) -> usize {
    debug!(worker = id, "worker started");
    let mut executed = 0usize;

    while !shutdown.is_cancelled() || !queue.is_empty() {
        while let Some(item) = queue.pop() {
            let index = item.index();
            trace!(worker = id, index, "running item");
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| item.run())) {
                warn!(worker = id, index, "work item panicked: {}", panic_message(payload));
            }
            executed += 1;
        }

        // Polling wait; bounded CPU tax instead of a blocking primitive.
        thread::sleep(idle_pause);
    }

    debug!(worker = id, executed, "worker stopped");
    executed
}
