//! Staged (SEDA) pipeline: three independently sized pools chained by
//! explicit continuation tasks.

use super::{
    errors::{panic_message, SpawnError},
    handle::{completion_pair, Completer, CompletionHandle},
    model::WorkItem,
    pool::{Executor, FixedWorkerPool, PoolConfig},
    result::SpawnResult,
    workload::Workload,
};
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, trace};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Compute,
    Delay,
    Output,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Compute => "compute",
            Stage::Delay => "delay",
            Stage::Output => "output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


const WITH_DELAY: &[Stage] = &[Stage::Compute, Stage::Delay, Stage::Output];
const DIRECT: &[Stage] = &[Stage::Compute, Stage::Output];

/// Ordered list of stages one item passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    stages: &'static [Stage],
}

impl Route {
    /// Every `batch_size`-th item (index 0 included) pays for the delay stage.
    ///
    /// `batch_size` must be positive; [`PipelineConfig::validate`] enforces it.
    #[inline]
    pub fn for_index(index: usize, batch_size: usize) -> Self {
        let stages = if index % batch_size == 0 { WITH_DELAY } else { DIRECT };
        Self { stages }
    }

    #[inline]
    pub fn stages(&self) -> &'static [Stage] {
        self.stages
    }

    #[inline]
    pub fn passes_delay(&self) -> bool {
        self.stages.contains(&Stage::Delay)
    }

    /// Number of items out of `item_count` that traverse the delay stage.
    pub fn delayed_count(item_count: usize, batch_size: usize) -> usize {
        item_count.div_ceil(batch_size)
    }
}


/// Конфигурация конвейера
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub compute_threads: usize,
    pub delay_threads: usize,
    pub output_threads: usize,
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compute_threads: num_cpus::get(),
            delay_threads: 2,
            output_threads: 2,
            batch_size: 5,
        }
    }
}

impl PipelineConfig {
    pub fn new(
        compute_threads: usize,
        delay_threads: usize,
        output_threads: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            compute_threads,
            delay_threads,
            output_threads,
            batch_size,
        }
    }

    pub fn validate(&self) -> SpawnResult<()> {
        for (stage, count) in [
            (Stage::Compute, self.compute_threads),
            (Stage::Delay, self.delay_threads),
            (Stage::Output, self.output_threads),
        ] {
            if count < 1 {
                return Err(SpawnError::InvalidThreadCount {
                    stage: stage.name(),
                    count,
                });
            }
        }
        if self.batch_size < 1 {
            return Err(SpawnError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }

    /// Threads across all three stages.
    pub fn thread_count(&self) -> usize {
        self.compute_threads + self.delay_threads + self.output_threads
    }
}


struct StagePools {
    compute: FixedWorkerPool,
    delay: FixedWorkerPool,
    output: FixedWorkerPool,
    workload: Arc<dyn Workload>,
}

impl StagePools {
    #[inline]
    fn pool(&self, stage: Stage) -> &FixedWorkerPool {
        match stage {
            Stage::Compute => &self.compute,
            Stage::Delay => &self.delay,
            Stage::Output => &self.output,
        }
    }
}


/// One item's continuation chain.
///
/// Runs the stage under `cursor`, then re-enqueues itself on the next
/// stage's pool, or resolves the handle after the last stage.
struct PipelineTask {
    index: usize,
    value: u64,
    route: Route,
    cursor: usize,
    pools: Arc<StagePools>,
    completer: Completer<()>,
}

impl PipelineTask {
    #[inline]
    fn stage(&self) -> Stage {
        self.route.stages()[self.cursor]
    }

    fn into_work_item(self) -> WorkItem {
        WorkItem::new(self.index, move || self.advance())
    }

    fn advance(mut self) {
        let stage = self.stage();
        let (index, value) = (self.index, self.value);
        let workload = &self.pools.workload;

        let ran = panic::catch_unwind(AssertUnwindSafe(|| match stage {
            Stage::Compute => Some(workload.compute(index)),
            Stage::Delay => {
                workload.delay(index);
                None
            }
            Stage::Output => {
                workload.output(index, value);
                None
            }
        }));

        match ran {
            Ok(Some(computed)) => self.value = computed,
            Ok(None) => {}
            Err(payload) => {
                let msg = format!("{} stage: {}", stage, panic_message(payload));
                self.completer.complete(Err(SpawnError::Panic(msg)));
                return;
            }
        }

        self.cursor += 1;
        if self.cursor == self.route.stages().len() {
            self.completer.complete(Ok(()));
            return;
        }

        let next = self.stage();
        trace!(index, from = %stage, to = %next, "stage handoff");
        let pools = self.pools.clone();
        // A refused task is dropped right here; its completer then resolves
        // the handle with `Rejected`.
        if let Err(e) = pools.pool(next).submit(self.into_work_item()) {
            debug!(index, stage = %next, error = %e, "continuation refused");
        }
    }
}


/// Compute, delay and output pools wired into per-item chains.
pub struct StagePipeline {
    config: PipelineConfig,
    pools: Arc<StagePools>,
}

impl StagePipeline {
    pub fn new(config: PipelineConfig, workload: Arc<dyn Workload>) -> SpawnResult<Self> {
        config.validate()?;

        let compute = FixedWorkerPool::with_config(PoolConfig::named("compute", config.compute_threads))?;
        let delay = FixedWorkerPool::with_config(PoolConfig::named("delay", config.delay_threads))?;
        let output = FixedWorkerPool::with_config(PoolConfig::named("output", config.output_threads))?;

        debug!(
            compute = config.compute_threads,
            delay = config.delay_threads,
            output = config.output_threads,
            batch_size = config.batch_size,
            "pipeline started"
        );

        Ok(Self {
            config,
            pools: Arc::new(StagePools {
                compute,
                delay,
                output,
                workload,
            }),
        })
    }

    /// Starts item `index` on the compute pool.
    pub fn submit(&self, index: usize) -> SpawnResult<CompletionHandle<()>> {
        let (completer, handle) = completion_pair();
        let task = PipelineTask {
            index,
            value: 0,
            route: Route::for_index(index, self.config.batch_size),
            cursor: 0,
            pools: self.pools.clone(),
            completer,
        };
        self.pools.compute.submit(task.into_work_item())?;
        Ok(handle)
    }

    /// Call only after every submitted chain has been joined; a continuation
    /// landing on a stopped stage would be rejected.
    pub fn shutdown(&self) {
        debug!("pipeline shutting down");
        self.pools.compute.shutdown();
        self.pools.delay.shutdown();
        self.pools.output.shutdown();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.pools.compute.is_active()
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn thread_count(&self) -> usize {
        self.pools.compute.thread_count()
            + self.pools.delay.thread_count()
            + self.pools.output.thread_count()
    }

    pub fn stage_threads(&self, stage: Stage) -> usize {
        self.pools.pool(stage).thread_count()
    }
}
