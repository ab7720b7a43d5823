pub mod diagnostics;
pub mod engine;
pub mod error;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, NullSink, Severity, TracingSink};
pub use engine::{CellGraph, CellState, Engine, EvalConfig, EvalMetrics, EvalResult};
pub use error::EvalError;

// Re-export common types
pub use linsheet_common::{CellDefinition, CellId, Definition, Term};
