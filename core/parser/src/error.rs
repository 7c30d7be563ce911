//! FILENAME: core/parser/src/error.rs
//! PURPOSE: Error category a formula can evaluate to (e.g. #DIV/0!).
//! CONTEXT: These are values, not call failures. Evaluation produces one of
//! these instead of a number, the owning cell stores it as its value, and
//! arithmetic over an errored subexpression propagates the error unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error categories formula evaluation can produce.
///
/// `Display` renders the mnemonic exactly as it appears in cell output.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaError {
    /// Reference to a position outside the sheet bounds.
    #[error("#REF!")]
    Ref,
    /// Text that cannot be coerced to a number.
    #[error("#VALUE!")]
    Value,
    /// Division by numeric zero, or arithmetic overflow.
    #[error("#DIV/0!")]
    Div0,
}
