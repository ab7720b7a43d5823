use std::sync::Arc;

use linsheet_common::{CellDefinition, CellId, Definition, Term};
use rustc_hash::{FxHashMap, FxHashSet};

use super::cell::{Cell, CellState, Contribution, Formula, Inputs};
use super::job::Job;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::EvalError;

/// Per-cell state plus the reverse dependency view used for propagation.
///
/// Owned exclusively by the coordinator. Workers only ever see the `Job`s
/// produced by [`CellGraph::feed`], which own their inputs outright.
pub struct CellGraph {
    cells: FxHashMap<CellId, Cell>,

    // dependency -> cells whose formulas reference it; an entry is removed
    // once the dependency has been propagated
    dependents: FxHashMap<CellId, FxHashSet<CellId>>,

    sink: Arc<dyn DiagnosticSink>,
}

impl Default for CellGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl CellGraph {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            cells: FxHashMap::default(),
            dependents: FxHashMap::default(),
            sink,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn state_of(&self, id: CellId) -> Option<CellState> {
        self.cells.get(&id).map(Cell::state)
    }

    /// The cell's value, whatever its state.
    pub fn value_of(&self, id: CellId) -> Option<i64> {
        self.cells.get(&id).map(Cell::value)
    }

    /// Number of unresolved formula terms. Zero for literals, unknown cells
    /// and cells whose formula has no terms.
    pub fn outstanding_count_of(&self, id: CellId) -> usize {
        self.cells.get(&id).map_or(0, Cell::outstanding)
    }

    /// Number of dependency sources that have not been propagated yet.
    pub fn pending_edge_count(&self) -> usize {
        self.dependents.len()
    }

    /// Apply one parsed definition.
    pub fn define(&mut self, definition: &CellDefinition) {
        match &definition.definition {
            Definition::Literal(value) => self.record_literal(definition.target, *value),
            Definition::Formula(terms) => {
                self.record_formula(definition.target, terms.iter().copied())
            }
        }
    }

    /// Define `id` as a constant. Overwrites any earlier definition.
    pub fn record_literal(&mut self, id: CellId, value: i64) {
        self.begin_definition(id);
        let cell = self.cells.entry(id).or_insert_with(Cell::undefined);
        cell.value = value;
        cell.state = CellState::Ready;
    }

    /// Define `id` as a weighted sum of `terms`. Overwrites any earlier
    /// definition; repeated dependencies after the first are reported and
    /// ignored.
    pub fn record_formula(&mut self, id: CellId, terms: impl IntoIterator<Item = Term>) {
        self.begin_definition(id);
        let cell = self.cells.entry(id).or_insert_with(Cell::undefined);
        cell.formula = Some(Formula::default());
        cell.state = CellState::Ready;
        for term in terms {
            self.add_dependency_edge(term.cell, id, term.coefficient);
        }
    }

    /// Register that `dependent` reads `dependency` with weight `coefficient`.
    ///
    /// Returns false (and reports a duplicate) if the pair already exists; the
    /// first coefficient is kept and `outstanding` is not incremented again.
    pub fn add_dependency_edge(
        &mut self,
        dependency: CellId,
        dependent: CellId,
        coefficient: i64,
    ) -> bool {
        self.cells.entry(dependency).or_insert_with(Cell::undefined);
        let cell = self.cells.entry(dependent).or_insert_with(Cell::undefined);
        if cell.formula.is_none() {
            cell.value = 0;
        }
        let formula = cell.formula.get_or_insert_with(Formula::default);
        if formula.contains_key(&dependency) {
            self.sink.report(Diagnostic::DuplicateDependency {
                cell: dependent,
                dependency,
            });
            return false;
        }
        formula.insert(dependency, coefficient);
        cell.outstanding += 1;
        cell.state = CellState::Blocked;
        self.dependents
            .entry(dependency)
            .or_default()
            .insert(dependent);
        true
    }

    /// One-shot: hand out the dependents of `id` and forget them, so a second
    /// call yields nothing.
    pub fn take_dependents(&mut self, id: CellId) -> FxHashSet<CellId> {
        self.dependents.remove(&id).unwrap_or_default()
    }

    /// Cells whose outstanding count is already zero, in id order.
    pub fn ready_cells(&self) -> Vec<CellId> {
        let mut ready: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.state == CellState::Ready)
            .map(|(id, _)| *id)
            .collect();
        ready.sort_unstable();
        ready
    }

    /// Finalize a frontier cell and return its value. `None` if the cell is
    /// not on a frontier path (never expected from the coordinator).
    pub(crate) fn settle(&mut self, id: CellId) -> Option<i64> {
        let cell = self.cells.get_mut(&id)?;
        match cell.state {
            CellState::Ready => {
                cell.state = CellState::Resolved;
                Some(cell.value)
            }
            CellState::Resolved => Some(cell.value),
            _ => None,
        }
    }

    /// Feed the resolved `value` of `source` into `dependent`.
    ///
    /// Returns a job exactly when this contribution brings the dependent's
    /// outstanding count to zero; the accumulated inputs move into it.
    pub(crate) fn feed(&mut self, dependent: CellId, source: CellId, value: i64) -> Option<Job> {
        let cell = self.cells.get_mut(&dependent)?;
        if cell.state != CellState::Blocked {
            return None;
        }
        let coefficient = *cell.formula.as_ref()?.get(&source)?;
        cell.inputs.push(Contribution { value, coefficient });
        cell.outstanding -= 1;
        if cell.outstanding > 0 {
            return None;
        }
        cell.state = CellState::Dispatched;
        let inputs: Inputs = std::mem::take(&mut cell.inputs);
        Some(Job::new(dependent, inputs))
    }

    /// Apply a worker's result to a dispatched cell.
    pub(crate) fn complete(&mut self, id: CellId, value: i64) -> Result<(), EvalError> {
        match self.cells.get_mut(&id) {
            Some(cell) if cell.state == CellState::Dispatched => {
                cell.value = value;
                cell.state = CellState::Resolved;
                Ok(())
            }
            _ => Err(EvalError::UnexpectedCompletion { cell: id }),
        }
    }

    /// Resolved cells and their values, ordered by id.
    pub fn resolved_values(&self) -> Vec<(CellId, i64)> {
        let mut values: Vec<(CellId, i64)> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.state == CellState::Resolved)
            .map(|(id, cell)| (*id, cell.value))
            .collect();
        values.sort_unstable_by_key(|(id, _)| *id);
        values
    }

    /// Cells that have no final value: blocked formulas, in-flight cells and
    /// undefined cells something still waits on. Ordered by id.
    pub fn unresolved_cells(&self) -> Vec<CellId> {
        let mut unresolved: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(id, cell)| match cell.state {
                CellState::Resolved => false,
                CellState::Undefined => self.dependents.contains_key(id),
                _ => true,
            })
            .map(|(id, _)| *id)
            .collect();
        unresolved.sort_unstable();
        unresolved
    }

    /// Reset `id` for a fresh definition, reporting if it had one already.
    fn begin_definition(&mut self, id: CellId) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        if cell.is_defined() {
            self.sink.report(Diagnostic::Redefinition { cell: id });
        }
        let old_formula = cell.formula.take();
        cell.value = 0;
        cell.outstanding = 0;
        cell.inputs.clear();
        if let Some(formula) = old_formula {
            self.detach(id, formula);
        }
    }

    /// Drop the reverse edges of a replaced formula, and any undefined
    /// placeholder nothing references any more.
    fn detach(&mut self, id: CellId, formula: Formula) {
        for dependency in formula.into_keys() {
            let Some(set) = self.dependents.get_mut(&dependency) else {
                continue;
            };
            set.remove(&id);
            if !set.is_empty() {
                continue;
            }
            self.dependents.remove(&dependency);
            if self
                .cells
                .get(&dependency)
                .is_some_and(|cell| cell.state == CellState::Undefined)
            {
                self.cells.remove(&dependency);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn id(name: &str) -> CellId {
        name.parse().unwrap()
    }

    fn graph() -> (CellGraph, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        (CellGraph::with_sink(sink.clone()), sink)
    }

    #[test]
    fn test_literal_is_ready() {
        let (mut g, _) = graph();
        g.record_literal(id("A1"), 3);
        assert_eq!(g.state_of(id("A1")), Some(CellState::Ready));
        assert_eq!(g.outstanding_count_of(id("A1")), 0);
        assert_eq!(g.value_of(id("A1")), Some(3));
    }

    #[test]
    fn test_formula_counts_distinct_terms() {
        let (mut g, sink) = graph();
        g.record_formula(
            id("C1"),
            [Term::plus(id("A1")), Term::minus(id("B1")), Term::plus(id("A1"))],
        );
        assert_eq!(g.outstanding_count_of(id("C1")), 2);
        assert_eq!(g.cell(id("C1")).unwrap().formula().unwrap()[&id("A1")], 1);
        assert_eq!(
            sink.snapshot(),
            vec![Diagnostic::DuplicateDependency {
                cell: id("C1"),
                dependency: id("A1")
            }]
        );
    }

    #[test]
    fn test_duplicate_edge_keeps_first_coefficient() {
        let (mut g, _) = graph();
        assert!(g.add_dependency_edge(id("A1"), id("B1"), -1));
        assert!(!g.add_dependency_edge(id("A1"), id("B1"), 5));
        assert_eq!(g.cell(id("B1")).unwrap().formula().unwrap()[&id("A1")], -1);
        assert_eq!(g.outstanding_count_of(id("B1")), 1);
    }

    #[test]
    fn test_referenced_cells_start_undefined() {
        let (mut g, _) = graph();
        g.record_formula(id("B1"), [Term::plus(id("A1"))]);
        assert_eq!(g.state_of(id("A1")), Some(CellState::Undefined));
        assert_eq!(g.state_of(id("B1")), Some(CellState::Blocked));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_take_dependents_is_one_shot() {
        let (mut g, _) = graph();
        g.record_literal(id("A1"), 1);
        g.record_formula(id("B1"), [Term::plus(id("A1"))]);
        g.record_formula(id("C1"), [Term::plus(id("A1"))]);
        let first = g.take_dependents(id("A1"));
        assert_eq!(first.len(), 2);
        assert!(g.take_dependents(id("A1")).is_empty());
        assert_eq!(g.pending_edge_count(), 0);
    }

    #[test]
    fn test_redefinition_replaces_formula_edges() {
        let (mut g, sink) = graph();
        g.record_literal(id("A1"), 1);
        g.record_formula(id("B1"), [Term::plus(id("A1")), Term::plus(id("Z9"))]);
        g.record_literal(id("B1"), 7);
        assert_eq!(g.state_of(id("B1")), Some(CellState::Ready));
        assert_eq!(g.value_of(id("B1")), Some(7));
        assert_eq!(g.pending_edge_count(), 0);
        // the placeholder only B1 referenced is gone
        assert_eq!(g.state_of(id("Z9")), None);
        assert_eq!(
            sink.snapshot(),
            vec![Diagnostic::Redefinition { cell: id("B1") }]
        );
    }

    #[test]
    fn test_feed_dispatches_on_last_input_only() {
        let (mut g, _) = graph();
        g.record_literal(id("A1"), 3);
        g.record_literal(id("B1"), 4);
        g.record_formula(id("C1"), [Term::plus(id("A1")), Term::minus(id("B1"))]);
        assert!(g.feed(id("C1"), id("A1"), 3).is_none());
        let job = g.feed(id("C1"), id("B1"), 4).expect("job on last input");
        assert_eq!(job.cell(), id("C1"));
        assert_eq!(job.inputs().len(), 2);
        assert_eq!(g.state_of(id("C1")), Some(CellState::Dispatched));
        // no second dispatch once in flight
        assert!(g.feed(id("C1"), id("B1"), 4).is_none());
    }

    #[test]
    fn test_complete_requires_dispatch() {
        let (mut g, _) = graph();
        g.record_literal(id("A1"), 3);
        assert!(matches!(
            g.complete(id("A1"), 9),
            Err(EvalError::UnexpectedCompletion { .. })
        ));
        assert!(matches!(
            g.complete(id("Q1"), 9),
            Err(EvalError::UnexpectedCompletion { .. })
        ));
    }

    #[test]
    fn test_zero_term_formula_is_ready() {
        let (mut g, _) = graph();
        g.record_formula(id("E1"), []);
        assert_eq!(g.state_of(id("E1")), Some(CellState::Ready));
        assert_eq!(g.ready_cells(), vec![id("E1")]);
    }
}
