use linsheet_common::CellId;

use super::cell::{Contribution, Inputs};

/// A dispatched unit of formula evaluation.
///
/// Owns a snapshot of the target's inputs moved out of the graph at dispatch
/// time; it holds no reference back into coordinator state.
#[derive(Debug)]
pub struct Job {
    cell: CellId,
    inputs: Inputs,
}

/// Result of one job: written once by a worker, read once by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub cell: CellId,
    pub value: i64,
}

impl Job {
    pub fn new(cell: CellId, inputs: Inputs) -> Self {
        Self { cell, inputs }
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    pub fn inputs(&self) -> &[Contribution] {
        &self.inputs
    }

    /// Weighted sum of the inputs. Wrapping arithmetic keeps this total:
    /// a job cannot fail or panic.
    pub fn run(self) -> Completion {
        let value = self
            .inputs
            .iter()
            .fold(0i64, |acc, input| acc.wrapping_add(input.weighted()));
        Completion {
            cell: self.cell,
            value,
        }
    }
}
