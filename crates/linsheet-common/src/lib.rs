//! Shared vocabulary for linsheet: the opaque [`CellId`] used to key every
//! engine map, and the [`CellDefinition`] records produced by the parser and
//! consumed by the evaluation engine.

pub mod cell_id;
pub mod definition;

pub use cell_id::*;
pub use definition::*;
