//! Side-channel reporting for non-fatal conditions.
//!
//! Nothing reported here changes control flow. The engine and the graph hold an
//! `Arc<dyn DiagnosticSink>` injected at construction; the default
//! [`TracingSink`] turns each report into a `tracing` event, while
//! [`CollectingSink`] keeps them in memory for inspection.

use std::fmt;

use linsheet_common::CellId;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A cell was defined more than once; the last definition wins.
    Redefinition { cell: CellId },
    /// `cell` references `dependency` more than once; only the first term counts.
    DuplicateDependency { cell: CellId, dependency: CellId },
    /// Cells left without a value at the end of a run (cycles or missing inputs).
    Unresolved { cells: Vec<CellId> },
    /// End-of-run job statistics.
    JobSummary {
        jobs_executed: usize,
        threads_used: usize,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::JobSummary { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Redefinition { cell } => write!(f, "{cell} is redefined"),
            Diagnostic::DuplicateDependency { cell, dependency } => {
                write!(f, "{cell} already depends on {dependency}, ignored")
            }
            Diagnostic::Unresolved { cells } => {
                f.write_str("the following are unresolved:")?;
                for cell in cells {
                    write!(f, " {cell}")?;
                }
                Ok(())
            }
            Diagnostic::JobSummary {
                jobs_executed,
                threads_used,
            } => write!(
                f,
                "total jobs executed: {jobs_executed}, threads used: {threads_used}"
            ),
        }
    }
}

/// Receiver for diagnostics. Must be callable from any thread.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`: warnings at WARN, summaries at INFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!(target: "linsheet::diagnostics", "{diagnostic}"),
            Severity::Info => tracing::info!(target: "linsheet::diagnostics", "{diagnostic}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.reports.lock().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.reports.lock())
    }

    pub fn count_where(&self, pred: impl Fn(&Diagnostic) -> bool) -> usize {
        self.reports.lock().iter().filter(|d| pred(d)).count()
    }

    /// All cells named in `Unresolved` reports, in report order.
    pub fn unresolved_reports(&self) -> Vec<Vec<CellId>> {
        self.reports
            .lock()
            .iter()
            .filter_map(|d| match d {
                Diagnostic::Unresolved { cells } => Some(cells.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.reports.lock().push(diagnostic);
    }
}
