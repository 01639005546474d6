//! Бенчмарк стратегий конкурентного выполнения
//!
//! Один и тот же поток небольших задач (CPU + задержка) выполняется тремя
//! способами, и сравнивается время:
//! - `FixedWorkerPool`: фиксированный пул постоянных потоков на общей очереди
//! - `StagePipeline`: SEDA-конвейер из трёх пулов (compute, delay, output)
//! - `BaselineExecutor`: стандартный блокирующий пул tokio как эталон
//!
//! `WorkloadDriver` отправляет задачи, ждёт все `CompletionHandle` и
//! возвращает `ExecutionReport`.

pub mod baseline;
pub mod driver;
pub mod errors;
pub mod handle;
pub mod model;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod result;
pub mod worker;
pub mod workload;

pub use baseline::BaselineExecutor;
pub use driver::{run_all, HarnessConfig, Strategy, WorkloadDriver};
pub use errors::SpawnError;
pub use handle::CompletionHandle;
pub use model::{ExecutionReport, StrategyKind, WorkItem};
pub use pipeline::{PipelineConfig, Route, Stage, StagePipeline};
pub use pool::{Executor, FixedWorkerPool, PoolConfig};
pub use result::SpawnResult;
pub use workload::{PrimeWorkload, Workload};
