//! linsheet dependency engine
//!
//! Evaluates literal and linear-formula cells by propagating readiness through
//! the dependency graph and dispatching formula evaluation to worker threads.

pub mod cell;
pub mod completion;
pub mod eval;
pub mod graph;
pub mod job;
pub mod metrics;
pub mod pool;

#[cfg(test)]
mod tests;

pub use cell::{Cell, CellState, Contribution, Formula, Inputs};
pub use completion::CompletionChannel;
pub use eval::{Engine, EvalResult};
pub use graph::CellGraph;
pub use job::{Completion, Job};
pub use metrics::EvalMetrics;
pub use pool::WorkerPool;

use std::num::NonZeroUsize;

/// Configuration for the evaluation engine
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Run jobs on a worker pool. When false, jobs run inline on the
    /// coordinator thread.
    pub enable_parallel: bool,
    /// Worker count; `None` uses the available hardware parallelism.
    pub max_threads: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            enable_parallel: true,
            max_threads: None,
        }
    }
}

impl EvalConfig {
    pub fn with_parallel(mut self, enable: bool) -> Self {
        self.enable_parallel = enable;
        self
    }

    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = Some(threads);
        self
    }

    /// Number of workers the pool will spawn (at least one).
    pub fn worker_count(&self) -> usize {
        self.max_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1)
            })
            .max(1)
    }
}
