//! Lightweight counters for evaluation runs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::ThreadId;

use linsheet_common::CellId;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

/// Statistics collected during evaluation.
///
/// Shared between the coordinator and the workers as an `Arc`; counters are
/// atomics and the set-valued fields sit behind their own locks. None of this
/// feeds back into scheduling.
#[derive(Default)]
pub struct EvalMetrics {
    pub jobs_dispatched: AtomicUsize,
    pub jobs_executed: AtomicUsize,
    pub batches_drained: AtomicUsize,
    pub largest_batch: AtomicUsize,

    threads: Mutex<FxHashSet<ThreadId>>,
    dispatches: Mutex<FxHashMap<CellId, u32>>,
}

impl EvalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator side: a job for `cell` left for a worker.
    pub fn record_dispatch(&self, cell: CellId) {
        self.jobs_dispatched.fetch_add(1, Ordering::Relaxed);
        *self.dispatches.lock().entry(cell).or_insert(0) += 1;
    }

    /// Worker side: a job finished on `thread`.
    pub fn record_execution(&self, thread: ThreadId) {
        self.jobs_executed.fetch_add(1, Ordering::Relaxed);
        self.threads.lock().insert(thread);
    }

    pub fn record_batch(&self, size: usize) {
        self.batches_drained.fetch_add(1, Ordering::Relaxed);
        self.largest_batch.fetch_max(size, Ordering::Relaxed);
    }

    pub fn jobs_dispatched(&self) -> usize {
        self.jobs_dispatched.load(Ordering::Relaxed)
    }

    pub fn jobs_executed(&self) -> usize {
        self.jobs_executed.load(Ordering::Relaxed)
    }

    pub fn batches_drained(&self) -> usize {
        self.batches_drained.load(Ordering::Relaxed)
    }

    pub fn largest_batch(&self) -> usize {
        self.largest_batch.load(Ordering::Relaxed)
    }

    /// Distinct threads that executed at least one job.
    pub fn threads_used(&self) -> usize {
        self.threads.lock().len()
    }

    pub fn dispatch_count(&self, cell: CellId) -> u32 {
        self.dispatches.lock().get(&cell).copied().unwrap_or(0)
    }

    /// Highest per-cell dispatch count; 1 on any correct run with jobs.
    pub fn max_dispatch_count(&self) -> u32 {
        self.dispatches.lock().values().copied().max().unwrap_or(0)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.jobs_dispatched.store(0, Ordering::Relaxed);
        self.jobs_executed.store(0, Ordering::Relaxed);
        self.batches_drained.store(0, Ordering::Relaxed);
        self.largest_batch.store(0, Ordering::Relaxed);
        self.threads.lock().clear();
        self.dispatches.lock().clear();
    }
}
