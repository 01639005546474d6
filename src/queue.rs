use super::model::WorkItem;
use crossbeam::deque::{Injector, Steal};

/// Unbounded multi-producer multi-consumer FIFO of pending items.
///
/// Push and pop are lock-free; callers never need external locking.
#[derive(Default)]
pub struct WorkQueue {
    inner: Injector<WorkItem>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self { inner: Injector::new() }
    }

    #[inline(always)]
    pub fn push(&self, item: WorkItem) {
        self.inner.push(item);
    }

    /// Takes the oldest item, or `None` if the queue is empty right now.
    #[inline]
    pub fn pop(&self) -> Option<WorkItem> {
        loop {
            match self.inner.steal() {
                Steal::Success(item) => return Some(item),
                Steal::Empty => return None,
                Steal::Retry => std::hint::spin_loop(),
            }
        }
    }

    /// Advisory only: other consumers may race between this check and a pop.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
