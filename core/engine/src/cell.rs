//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the fundamental data structures for a single spreadsheet cell.
//! CONTEXT: This file contains the `Cell` struct and `CellValue` enum.
//! A cell holds one of three kinds of content: nothing, literal text, or a
//! parsed formula. Formula cells memoize their computed value; the cache is
//! dropped when anything upstream changes (see the sheet's update path).
//! Text starting with an apostrophe escapes formula interpretation: the
//! stored text keeps the apostrophe, the value drops it.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

use parser::{FormulaError, ParseError, Position};

use crate::formula::Formula;
use crate::sheet::Sheet;

/// The computed value of a cell: a number, a piece of text, or the error
/// its formula evaluated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl fmt::Display for CellValue {
    /// Renders the value the way `print_values` shows it: plain number,
    /// text body, or error mnemonic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// The three kinds of cell content.
#[derive(Debug)]
enum CellContent {
    Empty,
    Text(String),
    Formula {
        formula: Formula,
        cache: RefCell<Option<CellValue>>,
    },
}

/// The atomic unit of the spreadsheet.
#[derive(Debug)]
pub struct Cell {
    content: CellContent,
}

impl Cell {
    /// Creates an empty cell (also used when a formula references a
    /// position nobody has written to yet).
    pub fn empty() -> Self {
        Cell {
            content: CellContent::Empty,
        }
    }

    /// Classifies raw input into cell content.
    ///
    /// Empty input makes an empty cell. Input starting with '=' (and longer
    /// than just the '=') is parsed as a formula. Everything else is text,
    /// including a lone "=" and anything starting with an apostrophe.
    pub fn from_input(input: &str) -> Result<Self, ParseError> {
        let content = if input.is_empty() {
            CellContent::Empty
        } else if let Some(body) = input.strip_prefix('=').filter(|body| !body.is_empty()) {
            CellContent::Formula {
                formula: Formula::parse(body)?,
                cache: RefCell::new(None),
            }
        } else {
            CellContent::Text(input.to_string())
        };
        Ok(Cell { content })
    }

    /// Returns the computed value of the cell.
    ///
    /// Empty cells read as the number 0, text cells as their body (without
    /// a leading apostrophe), and formula cells as their evaluation result,
    /// which is computed at most once per invalidation.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        match &self.content {
            CellContent::Empty => CellValue::Number(0.0),
            CellContent::Text(text) => {
                let body = text.strip_prefix('\'').unwrap_or(text);
                CellValue::Text(body.to_string())
            }
            CellContent::Formula { formula, cache } => {
                if let Some(value) = cache.borrow().as_ref() {
                    return value.clone();
                }
                let value = match formula.evaluate(sheet) {
                    Ok(number) => CellValue::Number(number),
                    Err(error) => CellValue::Error(error),
                };
                *cache.borrow_mut() = Some(value.clone());
                value
            }
        }
    }

    /// Returns the canonical source text of the cell: empty string, the
    /// literal text as entered, or '=' followed by the re-printed formula.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula { formula, .. } => format!("={}", formula.expression()),
        }
    }

    /// Returns the positions this cell's formula reads, sorted row-major
    /// with duplicates removed. Empty for non-formula cells.
    pub fn referenced_cells(&self) -> &[Position] {
        match &self.content {
            CellContent::Formula { formula, .. } => formula.referenced_cells(),
            _ => &[],
        }
    }

    /// Drops the memoized value, if any. The next `value()` call recomputes.
    pub fn invalidate(&self) {
        if let CellContent::Formula { cache, .. } = &self.content {
            *cache.borrow_mut() = None;
        }
    }

    /// Returns true for cells with no content.
    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }
}
