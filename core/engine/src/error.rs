//! FILENAME: core/engine/src/error.rs
//! PURPOSE: Structural errors raised by sheet-level operations.
//! CONTEXT: These are call failures, distinct from the #REF!/#VALUE!/#DIV/0!
//! values a formula can evaluate to. A failed operation leaves the sheet in
//! its pre-call state; nothing from this enum is ever stored in a cell.

use thiserror::Error;

use parser::{ParseError, Position};

/// Errors returned by sheet operations.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("invalid cell position: ({0}, {1})")]
    InvalidPosition(u32, u32),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("circular reference detected at {0}")]
    CircularDependency(Position),
}

impl SheetError {
    pub(crate) fn invalid_position(pos: Position) -> Self {
        SheetError::InvalidPosition(pos.row, pos.col)
    }
}
