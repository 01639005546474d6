#![allow(dead_code)]

use stagebench::Workload;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    thread,
    time::Duration,
};

/// Workload that only counts how often each stage ran, per item.
pub struct CountingWorkload {
    pub computed: Vec<AtomicUsize>,
    pub delayed: Vec<AtomicUsize>,
    pub outputs: Vec<AtomicUsize>,
    pub delayed_order: Mutex<Vec<usize>>,
    pub pause: Duration,
    /// Sleep inside `compute`.
    pub compute_pause: Duration,
    /// Panics in `compute` for this index.
    pub panic_on_compute: Option<usize>,
    /// Panics in `output` for this index.
    pub panic_on_output: Option<usize>,
}

impl CountingWorkload {
    pub fn new(items: usize) -> Self {
        Self {
            computed: (0..items).map(|_| AtomicUsize::new(0)).collect(),
            delayed: (0..items).map(|_| AtomicUsize::new(0)).collect(),
            outputs: (0..items).map(|_| AtomicUsize::new(0)).collect(),
            delayed_order: Mutex::new(Vec::new()),
            pause: Duration::ZERO,
            compute_pause: Duration::ZERO,
            panic_on_compute: None,
            panic_on_output: None,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_compute_pause(mut self, pause: Duration) -> Self {
        self.compute_pause = pause;
        self
    }

    pub fn total(counters: &[AtomicUsize]) -> usize {
        counters.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn all_exactly_once(counters: &[AtomicUsize]) -> bool {
        counters.iter().all(|c| c.load(Ordering::SeqCst) == 1)
    }

    pub fn delayed_indices(&self) -> Vec<usize> {
        let mut seen = self.delayed_order.lock().unwrap().clone();
        seen.sort_unstable();
        seen
    }
}

impl Workload for CountingWorkload {
    fn compute(&self, index: usize) -> u64 {
        if self.panic_on_compute == Some(index) {
            panic!("compute failed for item {}", index);
        }
        if !self.compute_pause.is_zero() {
            thread::sleep(self.compute_pause);
        }
        self.computed[index].fetch_add(1, Ordering::SeqCst);
        index as u64
    }

    fn delay(&self, index: usize) {
        self.delayed[index].fetch_add(1, Ordering::SeqCst);
        self.delayed_order.lock().unwrap().push(index);
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
    }

    fn output(&self, index: usize, value: u64) {
        if self.panic_on_output == Some(index) {
            panic!("output failed for item {}", index);
        }
        assert_eq!(value, index as u64, "value must travel unchanged");
        self.outputs[index].fetch_add(1, Ordering::SeqCst);
    }
}
