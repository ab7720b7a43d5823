use linsheet_common::CellId;
use thiserror::Error;

/// Failures of the evaluation engine itself.
///
/// Graph-level problems (redefinitions, duplicate references, cycles) are not
/// errors; they are reported through a [`DiagnosticSink`](crate::DiagnosticSink)
/// and the run degrades to partial output.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("graph is sealed: definitions cannot change after evaluation")]
    Sealed,
    #[error("completion received for {cell}, which has no job in flight")]
    UnexpectedCompletion { cell: CellId },
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
    #[error("worker pool is no longer accepting jobs")]
    WorkerDisconnected,
}
