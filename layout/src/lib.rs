//!
//! Functions in this crate turn a task's divisions into rows of table cells.
//!
//! Each division is resolved independently:
//! 1. Simple actor keys are mapped to their display column.
//! 2. Joint keys ("EV1 + EV2") are split, mapped, and checked to cover adjacent columns;
//!    the group then spans those columns as one merged cell.
//! 3. Every column of the task gets exactly one cell (possibly empty), left to right.
//!
//! Nothing here mutates the task; step numbering, which does carry state from
//! one division to the next, lives in [`StepCounter`] and belongs to the writer.

/// resolving one division into cells
mod resolver;
pub use resolver::{resolve_division, resolve_task, Cell, DivisionLayout, Series};

/// running step numbers per column
mod numbering;
pub use numbering::StepCounter;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("When joining actors, columns must be adjacent: \"{0}\" spans columns {1:?}")]
    NonAdjacentColumns(String, Vec<usize>),
    #[error("Actor(s) {0} used more than once in the same division")]
    DuplicateActor(String),
    #[error("Column \"{0}\" is not part of task \"{1}\"")]
    ColumnNotInTask(String, String),
}
