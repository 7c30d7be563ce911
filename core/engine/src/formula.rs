//! FILENAME: core/engine/src/formula.rs
//! PURPOSE: The formula facade: a parsed expression bound to sheet lookups.
//! CONTEXT: Wraps the parser's expression tree together with its referent
//! list. Evaluation resolves cell references through the sheet, coercing
//! whatever the referenced cell holds into a number:
//! - no cell at the position reads as 0,
//! - text must parse as a number in full, else #VALUE!,
//! - an errored cell propagates its error unchanged,
//! - an out-of-bounds position is #REF!.

use parser::{parse, Expr, FormulaError, ParseError, Position};

use crate::cell::CellValue;
use crate::sheet::Sheet;

/// A parsed formula. Parsing happens once; evaluation and re-printing walk
/// the retained tree.
#[derive(Debug)]
pub struct Formula {
    root: Expr,
    /// Referenced positions, row-major and deduplicated.
    referenced: Vec<Position>,
}

impl Formula {
    /// Parses a formula body (the text after '='). Keeps the AST and the
    /// unique referenced positions in row-major order.
    pub fn parse(expression: &str) -> Result<Formula, ParseError> {
        let (root, mut referenced) = parse(expression)?;
        referenced.sort_unstable();
        referenced.dedup();
        Ok(Formula { root, referenced })
    }

    /// Evaluates the formula against the given sheet.
    pub fn evaluate(&self, sheet: &Sheet) -> Result<f64, FormulaError> {
        self.root.evaluate(&|pos| lookup(sheet, pos))
    }

    /// Returns the canonical, minimally parenthesized expression text
    /// (without the leading '=').
    pub fn expression(&self) -> String {
        self.root.to_string()
    }

    /// Returns the referenced positions, sorted row-major, no duplicates.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }
}

/// Resolves one cell reference to a number, applying the coercion rules.
fn lookup(sheet: &Sheet, pos: Position) -> Result<f64, FormulaError> {
    if !pos.is_valid() {
        return Err(FormulaError::Ref);
    }
    let Some(cell) = sheet.cell_at(pos) else {
        return Ok(0.0);
    };
    match cell.value(sheet) {
        CellValue::Number(number) => Ok(number),
        CellValue::Text(text) => text.parse::<f64>().map_err(|_| FormulaError::Value),
        CellValue::Error(error) => Err(error),
    }
}
