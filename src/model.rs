use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The atomic scheduling unit: an index plus the action to run for it.
pub struct WorkItem {
    index: usize,
    action: Task,
}

impl WorkItem {
    pub fn new<F>(index: usize, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            index,
            action: Box::new(action),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub fn run(self) {
        (self.action)()
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem").field("index", &self.index).finish()
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    FixedPool,
    Pipeline,
    Baseline,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::FixedPool => "Custom Fixed Pool Scheduler",
            StrategyKind::Pipeline => "SEDA Architecture",
            StrategyKind::Baseline => "Default Scheduler",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


/// Timing of one completed driver run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub strategy: StrategyKind,
    pub thread_count: usize,
    pub item_count: usize,
    pub batch_size: Option<usize>,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
    pub elapsed: Duration,
}

impl ExecutionReport {
    /// Items per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.item_count as f64 / secs
    }

    pub fn average_latency(&self) -> Duration {
        if self.item_count == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.elapsed.as_secs_f64() / self.item_count as f64)
    }
}

fn epoch_millis(t: SystemTime) -> u128 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Previous Execution Report")?;
        writeln!(f, "-----------------------------------------------")?;
        writeln!(f, "Executor Type: {}", self.strategy)?;
        writeln!(f, "Thread Count: {}", self.thread_count)?;
        writeln!(f, "Workload Count: {}", self.item_count)?;
        if let Some(batch) = self.batch_size {
            writeln!(f, "Batch Size: {}", batch)?;
        }
        writeln!(f, "Execution Start Time: {} ms since epoch", epoch_millis(self.started_at))?;
        writeln!(f, "Execution End Time: {} ms since epoch", epoch_millis(self.finished_at))?;
        writeln!(f, "Total Duration: {} ms", self.elapsed.as_millis())?;
        writeln!(f, "Average Throughput: {:.2} tasks/sec", self.throughput())?;
        writeln!(f, "Average Latency: {:.3} ms", self.average_latency().as_secs_f64() * 1000.0)?;
        writeln!(f, "-----------------------------------------------")
    }
}
