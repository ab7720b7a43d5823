use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::completion::CompletionChannel;
use super::job::Job;
use super::metrics::EvalMetrics;
use crate::error::EvalError;

/// Fixed set of long-lived worker threads fed from a FIFO task queue.
///
/// Workers share nothing with the coordinator except the queue, the
/// completion channel and the metrics collector. Dropping the pool (or
/// calling [`WorkerPool::shutdown`]) closes the queue and joins every worker.
pub struct WorkerPool {
    tasks: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(
        threads: usize,
        completions: Arc<CompletionChannel>,
        metrics: Arc<EvalMetrics>,
    ) -> Result<Self, EvalError> {
        let threads = threads.max(1);
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let mut pool = Self {
            tasks: Some(sender),
            workers: Vec::with_capacity(threads),
        };
        for index in 0..threads {
            let receiver = receiver.clone();
            let completions = Arc::clone(&completions);
            let metrics = Arc::clone(&metrics);
            // on error `pool` drops here, joining the workers already started
            let handle = thread::Builder::new()
                .name(format!("linsheet-worker-{index}"))
                .spawn(move || worker_loop(receiver, completions, metrics))?;
            pool.workers.push(handle);
        }
        tracing::debug!(workers = threads, "worker pool started");
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job. Returns immediately.
    pub fn submit(&self, job: Job) -> Result<(), EvalError> {
        let tasks = self.tasks.as_ref().ok_or(EvalError::WorkerDisconnected)?;
        tasks.send(job).map_err(|_| EvalError::WorkerDisconnected)
    }

    /// Close the queue and wait for every worker to exit.
    pub fn shutdown(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        // workers leave their loop once the queue is closed and drained
        drop(self.tasks.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

fn worker_loop(tasks: Receiver<Job>, completions: Arc<CompletionChannel>, metrics: Arc<EvalMetrics>) {
    while let Ok(job) = tasks.recv() {
        let completion = job.run();
        metrics.record_execution(thread::current().id());
        completions.push(completion);
    }
}
