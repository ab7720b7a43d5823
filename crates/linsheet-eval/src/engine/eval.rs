use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use linsheet_common::{CellDefinition, CellId};

use super::completion::CompletionChannel;
use super::graph::CellGraph;
use super::job::{Completion, Job};
use super::metrics::EvalMetrics;
use super::pool::WorkerPool;
use super::{CellState, EvalConfig};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::EvalError;

/// The coordinator: owns the cell graph and the readiness frontier, hands
/// ready formulas to the worker pool and folds their results back in.
pub struct Engine {
    graph: CellGraph,
    pub config: EvalConfig,
    worker_pool: Option<WorkerPool>,
    completions: Arc<CompletionChannel>,
    metrics: Arc<EvalMetrics>,
    sink: Arc<dyn DiagnosticSink>,
    last_result: Option<EvalResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalResult {
    /// Cells holding a final value (literals included).
    pub resolved: usize,
    /// Cells left without a value, ordered by id.
    pub unresolved: Vec<CellId>,
    pub jobs_executed: usize,
    pub batches_drained: usize,
    pub elapsed: Duration,
}

impl EvalResult {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl Engine {
    pub fn new(config: EvalConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: EvalConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::with_observers(config, sink, Arc::new(EvalMetrics::new()))
    }

    /// Create an engine reporting to caller-owned diagnostics and metrics.
    pub fn with_observers(
        config: EvalConfig,
        sink: Arc<dyn DiagnosticSink>,
        metrics: Arc<EvalMetrics>,
    ) -> Self {
        let completions = Arc::new(CompletionChannel::new());

        let worker_pool = if config.enable_parallel {
            match WorkerPool::new(
                config.worker_count(),
                Arc::clone(&completions),
                Arc::clone(&metrics),
            ) {
                Ok(pool) => Some(pool),
                Err(err) => {
                    // Fall back to inline evaluation if the pool cannot start
                    tracing::warn!(%err, "worker pool unavailable, evaluating inline");
                    None
                }
            }
        } else {
            None
        };

        Self {
            graph: CellGraph::with_sink(Arc::clone(&sink)),
            config,
            worker_pool,
            completions,
            metrics,
            sink,
            last_result: None,
        }
    }

    pub fn graph(&self) -> &CellGraph {
        &self.graph
    }

    pub fn metrics(&self) -> &EvalMetrics {
        &self.metrics
    }

    /// Number of pool workers; 0 when jobs run inline.
    pub fn worker_count(&self) -> usize {
        self.worker_pool.as_ref().map_or(0, WorkerPool::size)
    }

    pub fn is_sealed(&self) -> bool {
        self.last_result.is_some()
    }

    pub fn define(&mut self, definition: &CellDefinition) -> Result<(), EvalError> {
        if self.is_sealed() {
            return Err(EvalError::Sealed);
        }
        self.graph.define(definition);
        Ok(())
    }

    pub fn load<'a, I>(&mut self, definitions: I) -> Result<(), EvalError>
    where
        I: IntoIterator<Item = &'a CellDefinition>,
    {
        for definition in definitions {
            self.define(definition)?;
        }
        Ok(())
    }

    /// Final value of a resolved cell.
    pub fn value_of(&self, cell: CellId) -> Option<i64> {
        match self.graph.state_of(cell)? {
            CellState::Resolved => self.graph.value_of(cell),
            _ => None,
        }
    }

    /// Every resolved cell with its value, ordered by id.
    pub fn resolved_values(&self) -> Vec<(CellId, i64)> {
        self.graph.resolved_values()
    }

    /// Run the graph to quiescence.
    ///
    /// Kahn's algorithm where the decrement that readies a formula cell
    /// dispatches it as a job instead of queueing it; finished jobs come back
    /// through the completion channel and re-enter the frontier. Terminates
    /// when the frontier is empty and no job is in flight. Whatever is left is
    /// reported once as unresolved. Calling this again returns the first
    /// run's summary.
    pub fn evaluate_all(&mut self) -> Result<EvalResult, EvalError> {
        if let Some(result) = &self.last_result {
            return Ok(result.clone());
        }

        let _span = tracing::info_span!(
            "evaluate_all",
            cells = self.graph.len(),
            workers = self.worker_count()
        )
        .entered();
        let start = Instant::now();

        let mut frontier: VecDeque<CellId> = self.graph.ready_cells().into();
        let mut in_flight = 0usize;

        loop {
            while let Some(cell) = frontier.pop_front() {
                let Some(value) = self.graph.settle(cell) else {
                    continue;
                };
                for dependent in self.graph.take_dependents(cell) {
                    if let Some(job) = self.graph.feed(dependent, cell, value) {
                        self.dispatch(job)?;
                        in_flight += 1;
                    }
                }
            }

            if in_flight == 0 {
                break;
            }

            let batch = self.completions.drain_blocking();
            self.metrics.record_batch(batch.len());
            tracing::debug!(size = batch.len(), in_flight, "drained completions");
            for Completion { cell, value } in batch {
                self.graph.complete(cell, value)?;
                in_flight -= 1;
                frontier.push_back(cell);
            }
        }

        let unresolved = self.graph.unresolved_cells();
        if !unresolved.is_empty() {
            self.sink.report(Diagnostic::Unresolved {
                cells: unresolved.clone(),
            });
        }
        self.sink.report(Diagnostic::JobSummary {
            jobs_executed: self.metrics.jobs_executed(),
            threads_used: self.metrics.threads_used(),
        });

        let result = EvalResult {
            resolved: self.graph.resolved_values().len(),
            unresolved,
            jobs_executed: self.metrics.jobs_executed(),
            batches_drained: self.metrics.batches_drained(),
            elapsed: start.elapsed(),
        };
        self.last_result = Some(result.clone());
        Ok(result)
    }

    /// Stop and join the worker pool. Dropping the engine does the same.
    pub fn shutdown(mut self) {
        if let Some(pool) = self.worker_pool.take() {
            pool.shutdown();
        }
    }

    fn dispatch(&self, job: Job) -> Result<(), EvalError> {
        self.metrics.record_dispatch(job.cell());
        tracing::trace!(cell = %job.cell(), inputs = job.inputs().len(), "dispatch");
        match &self.worker_pool {
            Some(pool) => pool.submit(job),
            None => {
                let completion = job.run();
                self.metrics.record_execution(std::thread::current().id());
                self.completions.push(completion);
                Ok(())
            }
        }
    }
}
