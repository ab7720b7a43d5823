//! End-to-end evaluation scenarios through the coordinator.
use super::common::{Harness, evaluate, id, inline_config, pool_config};
use crate::diagnostics::Diagnostic;
use crate::engine::CellState;
use crate::error::EvalError;
use linsheet_common::CellDefinition;

#[test]
fn test_sum_of_two_literals() {
    let h = evaluate("A1 = 3\nB1 = 4\nC1 = A1 + B1\n", pool_config(4));
    assert_eq!(h.value("C1"), Some(7));
    assert_eq!(h.rendered(), vec!["A1 = 3", "B1 = 4", "C1 = 7"]);
}

#[test]
fn test_diamond_difference_is_zero() {
    let source = "D1 = B1 - C1\nB1 = A1\nC1 = A1\nA1 = 10\n";
    for config in [pool_config(1), pool_config(2), pool_config(8), inline_config()] {
        let h = evaluate(source, config);
        assert_eq!(h.value("D1"), Some(0));
        assert_eq!(h.value("B1"), Some(10));
        assert_eq!(h.value("C1"), Some(10));
    }
}

#[test]
fn test_chain_propagates_through_jobs() {
    let h = evaluate("A1 = 2\nA2 = A1\nA3 = A2 + A1\nA4 = A3 - A1 + A2\n", pool_config(3));
    assert_eq!(h.value("A2"), Some(2));
    assert_eq!(h.value("A3"), Some(4));
    assert_eq!(h.value("A4"), Some(4));
    assert_eq!(h.metrics.jobs_executed(), 3);
}

#[test]
fn test_acyclic_graph_leaves_no_pending_edges() {
    let mut h = Harness::new(pool_config(4));
    h.load_source("A1 = 1\nB1 = 2\nC1 = A1 + B1\nD1 = C1 - A1\nE1 = D1 + C1 + B1\n");
    let result = h.run();
    assert!(result.is_complete());
    assert_eq!(result.resolved, 5);
    assert_eq!(h.engine.graph().pending_edge_count(), 0);
    assert_eq!(h.value("E1"), Some(2 + 3 + 2));
    assert!(h.sink.unresolved_reports().is_empty());
}

#[test]
fn test_last_literal_definition_wins() {
    let h = evaluate("A1 = 1\nB1 = A1 + A1\nA1 = 5\n", pool_config(2));
    assert_eq!(h.value("A1"), Some(5));
    assert_eq!(h.value("B1"), Some(5));
    assert_eq!(
        h.sink
            .count_where(|d| matches!(d, Diagnostic::Redefinition { .. })),
        1
    );
}

#[test]
fn test_duplicate_reference_counts_once() {
    let h = evaluate("A1 = 6\nB1 = A1 + A1 - A1\n", pool_config(2));
    assert_eq!(h.value("B1"), Some(6));
    assert_eq!(
        h.sink
            .count_where(|d| matches!(d, Diagnostic::DuplicateDependency { .. })),
        2
    );
}

#[test]
fn test_formula_redefined_as_literal_drops_old_inputs() {
    let h = evaluate("A1 = 1\nB1 = A1\nB1 = 40\nC1 = B1 + A1\n", pool_config(2));
    assert_eq!(h.value("B1"), Some(40));
    assert_eq!(h.value("C1"), Some(41));
    assert_eq!(h.metrics.jobs_executed(), 1);
}

#[test]
fn test_literal_redefined_as_formula() {
    let h = evaluate("A1 = 1\nB1 = 9\nB1 = -A1\n", pool_config(2));
    assert_eq!(h.value("B1"), Some(-1));
}

#[test]
fn test_arbitrary_integer_weights() {
    let mut h = Harness::new(inline_config());
    h.engine
        .load(&[
            CellDefinition::literal(id("A1"), 7),
            CellDefinition::literal(id("A2"), -3),
            CellDefinition::formula(
                id("B1"),
                vec![
                    linsheet_common::Term::new(id("A1"), 4),
                    linsheet_common::Term::new(id("A2"), -10),
                ],
            ),
        ])
        .unwrap();
    h.run();
    assert_eq!(h.value("B1"), Some(28 + 30));
}

#[test]
fn test_zero_term_formula_resolves_to_zero() {
    let mut h = Harness::new(pool_config(2));
    h.engine
        .define(&CellDefinition::formula(id("Z1"), Vec::new()))
        .unwrap();
    let result = h.run();
    assert!(result.is_complete());
    assert_eq!(h.value("Z1"), Some(0));
    assert_eq!(result.jobs_executed, 0);
}

#[test]
fn test_literals_never_become_jobs() {
    let h = evaluate("A1 = 1\nA2 = 2\nA3 = 3\n", pool_config(4));
    assert_eq!(h.metrics.jobs_dispatched(), 0);
    assert_eq!(h.metrics.batches_drained(), 0);
    assert_eq!(h.rendered().len(), 3);
}

#[test]
fn test_empty_graph() {
    let mut h = Harness::new(pool_config(2));
    let result = h.run();
    assert_eq!(result.resolved, 0);
    assert!(result.is_complete());
    assert_eq!(
        h.sink.snapshot(),
        vec![Diagnostic::JobSummary {
            jobs_executed: 0,
            threads_used: 0
        }]
    );
}

#[test]
fn test_graph_is_sealed_after_evaluation() {
    let mut h = Harness::new(pool_config(2));
    h.load_source("A1 = 1\nB1 = A1\n");
    let first = h.run();
    assert!(h.engine.is_sealed());
    assert!(matches!(
        h.engine.define(&CellDefinition::literal(id("A1"), 2)),
        Err(EvalError::Sealed)
    ));
    // second run is a no-op returning the same summary
    let second = h.run();
    assert_eq!(first, second);
    assert_eq!(h.metrics.jobs_executed(), 1);
    assert_eq!(h.value("B1"), Some(1));
}

#[test]
fn test_states_after_run() {
    let h = evaluate("A1 = 1\nB1 = A1\nC1 = Q1\n", pool_config(2));
    let graph = h.engine.graph();
    assert_eq!(graph.state_of(id("A1")), Some(CellState::Resolved));
    assert_eq!(graph.state_of(id("B1")), Some(CellState::Resolved));
    assert_eq!(graph.state_of(id("C1")), Some(CellState::Blocked));
    assert_eq!(graph.state_of(id("Q1")), Some(CellState::Undefined));
    assert_eq!(h.engine.value_of(id("C1")), None);
}

#[test]
fn test_shutdown_joins_pool() {
    let mut h = Harness::new(pool_config(3));
    h.load_source("A1 = 1\nB1 = A1\n");
    h.run();
    assert_eq!(h.engine.worker_count(), 3);
    h.engine.shutdown();
}
