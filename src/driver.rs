use super::{
    baseline::BaselineExecutor,
    errors::SpawnError,
    handle::CompletionHandle,
    model::{ExecutionReport, StrategyKind},
    pipeline::{PipelineConfig, StagePipeline},
    pool::{Executor, FixedWorkerPool, PoolConfig},
    result::SpawnResult,
    workload::{PrimeWorkload, Workload},
};
use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};
use tracing::{info, warn};


/// An execution strategy the driver can time.
pub trait Strategy {
    fn kind(&self) -> StrategyKind;

    /// Threads the strategy owns in total.
    fn total_threads(&self) -> usize;

    fn batch(&self) -> Option<usize> {
        None
    }

    /// Schedules item `index` of `workload`; never blocks.
    fn dispatch(&self, index: usize, workload: &Arc<dyn Workload>) -> SpawnResult<CompletionHandle<()>>;

    /// Stops acceptance. Only call once every dispatched item was joined.
    fn close(&self);
}

fn dispatch_whole<E: Executor>(
    executor: &E,
    index: usize,
    workload: &Arc<dyn Workload>,
) -> SpawnResult<CompletionHandle<()>> {
    let workload = workload.clone();
    executor.spawn(index, move || workload.process(index))
}

impl Strategy for FixedWorkerPool {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FixedPool
    }

    fn total_threads(&self) -> usize {
        self.thread_count()
    }

    fn dispatch(&self, index: usize, workload: &Arc<dyn Workload>) -> SpawnResult<CompletionHandle<()>> {
        dispatch_whole(self, index, workload)
    }

    fn close(&self) {
        self.shutdown();
    }
}

impl Strategy for BaselineExecutor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Baseline
    }

    fn total_threads(&self) -> usize {
        self.thread_count()
    }

    fn dispatch(&self, index: usize, workload: &Arc<dyn Workload>) -> SpawnResult<CompletionHandle<()>> {
        dispatch_whole(self, index, workload)
    }

    fn close(&self) {
        self.shutdown();
    }
}

impl Strategy for StagePipeline {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pipeline
    }

    fn total_threads(&self) -> usize {
        self.thread_count()
    }

    fn batch(&self) -> Option<usize> {
        Some(self.batch_size())
    }

    // Bound to its workload at construction; splits each item into stages.
    fn dispatch(&self, index: usize, _workload: &Arc<dyn Workload>) -> SpawnResult<CompletionHandle<()>> {
        self.submit(index)
    }

    fn close(&self) {
        self.shutdown();
    }
}


/// Submits a workload to a strategy and times it end to end.
pub struct WorkloadDriver {
    workload: Arc<dyn Workload>,
}

impl WorkloadDriver {
    pub fn new(workload: Arc<dyn Workload>) -> Self {
        Self { workload }
    }

    pub fn workload(&self) -> &Arc<dyn Workload> {
        &self.workload
    }

    /// Submits items `0..item_count`, then blocks until every handle resolves.
    ///
    /// The first submission or item failure is returned instead of a report.
    /// Handles already obtained are still joined before returning so no item
    /// outlives the run.
    pub fn run<S>(&self, strategy: &S, item_count: usize) -> SpawnResult<ExecutionReport>
    where
        S: Strategy + ?Sized,
    {
        if item_count == 0 {
            return Err(SpawnError::InvalidItemCount);
        }

        let kind = strategy.kind();
        info!(strategy = %kind, item_count, threads = strategy.total_threads(), "run started");

        let mut handles = Vec::with_capacity(item_count);
        let mut failure = None;

        let started_at = SystemTime::now();
        let clock = Instant::now();

        for index in 0..item_count {
            match strategy.dispatch(index, &self.workload) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        for handle in handles {
            if let Err(e) = handle.join() {
                failure.get_or_insert(e);
            }
        }

        let elapsed = clock.elapsed();
        let finished_at = started_at + elapsed;

        if let Some(e) = failure {
            warn!(strategy = %kind, error = %e, "run aborted");
            return Err(e);
        }

        info!(strategy = %kind, elapsed_ms = elapsed.as_millis() as u64, "run finished");

        Ok(ExecutionReport {
            strategy: kind,
            thread_count: strategy.total_threads(),
            item_count,
            batch_size: strategy.batch(),
            started_at,
            finished_at,
            elapsed,
        })
    }

    /// Runs, then closes the strategy. Closing happens strictly after the join.
    pub fn run_and_close<S>(&self, strategy: &S, item_count: usize) -> SpawnResult<ExecutionReport>
    where
        S: Strategy + ?Sized,
    {
        let report = self.run(strategy, item_count);
        strategy.close();
        report
    }
}


/// Настройки полного прогона всех трёх стратегий.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub item_count: usize,
    /// Threads for the fixed pool and the baseline.
    pub pool_threads: usize,
    pub pipeline: PipelineConfig,
    /// Fixed pause injected per item (every item for the single-pool
    /// strategies, every `batch_size`-th item in the pipeline).
    pub delay: Duration,
    /// Print every computed prime, as the harness always did.
    pub echo: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            item_count: 1_000,
            pool_threads: num_cpus::get(),
            pipeline: PipelineConfig::default(),
            delay: Duration::from_millis(10),
            echo: true,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> SpawnResult<()> {
        if self.item_count == 0 {
            return Err(SpawnError::InvalidItemCount);
        }
        if self.pool_threads < 1 {
            return Err(SpawnError::InvalidThreadCount {
                stage: "pool",
                count: self.pool_threads,
            });
        }
        self.pipeline.validate()
    }
}

/// Fixed pool, then pipeline, then baseline; each built fresh and closed
/// after its own run.
pub fn run_all(config: &HarnessConfig) -> SpawnResult<Vec<ExecutionReport>> {
    config.validate()?;

    let workload: Arc<dyn Workload> = Arc::new(PrimeWorkload::new(config.delay, config.echo));
    let driver = WorkloadDriver::new(workload.clone());
    let mut reports = Vec::with_capacity(3);

    let pool = FixedWorkerPool::with_config(PoolConfig::named("fixed", config.pool_threads))?;
    reports.push(driver.run_and_close(&pool, config.item_count)?);

    let pipeline = StagePipeline::new(config.pipeline.clone(), workload)?;
    reports.push(driver.run_and_close(&pipeline, config.item_count)?);

    let baseline = BaselineExecutor::new(config.pool_threads)?;
    reports.push(driver.run_and_close(&baseline, config.item_count)?);

    Ok(reports)
}
