//! Meta crate that re-exports the linsheet building blocks and wires them
//! into a single parse, evaluate and render pipeline.

pub mod output;

pub use linsheet_common as common;
pub use linsheet_eval as eval;
pub use linsheet_parse as parse;

pub use linsheet_common::{CellDefinition, CellId, Definition, Term};
pub use linsheet_eval::{Engine, EvalConfig, EvalError, EvalResult};
pub use output::{OutputFormat, Report};

/// Evaluate `definitions` on a fresh engine and collect the outcome.
///
/// Diagnostics go to the tracing sink. The worker pool is joined before
/// returning.
pub fn evaluate(definitions: &[CellDefinition], config: EvalConfig) -> Result<Report, EvalError> {
    let mut engine = Engine::new(config);
    engine.load(definitions)?;
    let summary = engine.evaluate_all()?;
    let report = Report {
        values: engine.resolved_values(),
        unresolved: summary.unresolved.clone(),
        summary,
    };
    engine.shutdown();
    Ok(report)
}

/// Parse `source` and evaluate it. Malformed lines are logged and skipped.
pub fn evaluate_source(source: &str, config: EvalConfig) -> Result<Report, EvalError> {
    let parsed = linsheet_parse::parse_source(source);
    for error in &parsed.errors {
        tracing::warn!(line = error.line, "{}", error.kind);
    }
    evaluate(&parsed.definitions, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_source_end_to_end() {
        let report = evaluate_source(
            "A1 = 3\nB1 = 4\nC1 = A1 + B1\nD1 = E1\n",
            EvalConfig::default().with_max_threads(2),
        )
        .unwrap();
        let c1: CellId = "C1".parse().unwrap();
        assert!(report.values.contains(&(c1, 7)));
        assert_eq!(report.values.len(), 3);
        assert_eq!(report.unresolved.len(), 2);
        assert_eq!(report.summary.jobs_executed, 1);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let report = evaluate_source("A1 = 1\nB1 =\nC1 = A1 2\nD1 = -A1\n", EvalConfig::default())
            .unwrap();
        assert_eq!(report.values.len(), 2);
        assert_eq!(report.values[1].1, -1);
    }
}
