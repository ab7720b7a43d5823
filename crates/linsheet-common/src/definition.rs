use crate::CellId;

/// One weighted reference inside a linear formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    pub cell: CellId,
    pub coefficient: i64,
}

impl Term {
    pub fn new(cell: CellId, coefficient: i64) -> Self {
        Self { cell, coefficient }
    }

    /// A `+cell` term.
    pub fn plus(cell: CellId) -> Self {
        Self::new(cell, 1)
    }

    /// A `-cell` term.
    pub fn minus(cell: CellId) -> Self {
        Self::new(cell, -1)
    }
}

/// Right-hand side of a cell definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Definition {
    /// A constant integer value.
    Literal(i64),
    /// A weighted sum of other cells, in source order. Duplicates are kept
    /// as written; the graph decides what to do with them.
    Formula(Vec<Term>),
}

/// A complete `target = definition` record, as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellDefinition {
    pub target: CellId,
    pub definition: Definition,
}

impl CellDefinition {
    pub fn literal(target: CellId, value: i64) -> Self {
        Self {
            target,
            definition: Definition::Literal(value),
        }
    }

    pub fn formula(target: CellId, terms: Vec<Term>) -> Self {
        Self {
            target,
            definition: Definition::Formula(terms),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.definition, Definition::Literal(_))
    }
}
