use linsheet_common::CellId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Dependency -> integer weight.
pub type Formula = FxHashMap<CellId, i64>;

/// Contributions gathered for a cell before it is dispatched.
pub type Inputs = SmallVec<[Contribution; 4]>;

/// One resolved dependency value paired with the weight the dependent gives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub value: i64,
    pub coefficient: i64,
}

impl Contribution {
    #[inline]
    pub fn weighted(self) -> i64 {
        self.value.wrapping_mul(self.coefficient)
    }
}

/// Lifecycle of a cell during one evaluation run.
///
/// `Ready -> Resolved` for literals and zero-term formulas,
/// `Blocked -> Dispatched -> Resolved` for formulas with inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Referenced by a formula but never defined.
    Undefined,
    /// Waiting on `outstanding` dependencies.
    Blocked,
    /// Eligible for the frontier; value is already final.
    Ready,
    /// A job computing this cell is in flight.
    Dispatched,
    Resolved,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) value: i64,
    pub(crate) outstanding: usize,
    pub(crate) inputs: Inputs,
    pub(crate) formula: Option<Formula>,
    pub(crate) state: CellState,
}

impl Cell {
    pub(crate) fn undefined() -> Self {
        Self {
            value: 0,
            outstanding: 0,
            inputs: Inputs::new(),
            formula: None,
            state: CellState::Undefined,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    pub fn is_defined(&self) -> bool {
        self.state != CellState::Undefined
    }

    pub fn is_literal(&self) -> bool {
        self.is_defined() && self.formula.is_none()
    }
}
