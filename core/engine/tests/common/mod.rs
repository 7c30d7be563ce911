//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for engine integration tests.

#![allow(dead_code)]

use engine::{CellValue, FormulaError, Position, Sheet};

/// Parses an A1 reference, panicking on typos in test code.
pub fn pos(a1: &str) -> Position {
    Position::from_a1(a1).unwrap_or_else(|| panic!("bad test position: {}", a1))
}

/// Test harness wrapping a sheet with A1-addressed helpers.
pub struct TestHarness {
    pub sheet: Sheet,
}

impl TestHarness {
    /// Create a new harness with an empty sheet.
    pub fn new() -> Self {
        TestHarness {
            sheet: Sheet::new(),
        }
    }

    /// Create a harness with a small chain of formulas:
    /// A1 = 1, A2 = A1 + 1, A3 = A2 + 1.
    pub fn with_arithmetic_chain() -> Self {
        let mut harness = Self::new();
        harness.set("A1", "1");
        harness.set("A2", "=A1+1");
        harness.set("A3", "=A2+1");
        harness
    }

    /// Set a cell, panicking on failure (use `sheet.set_cell` directly when
    /// the test expects an error).
    pub fn set(&mut self, a1: &str, text: &str) {
        self.sheet
            .set_cell(pos(a1), text)
            .unwrap_or_else(|e| panic!("set {} = {:?} failed: {}", a1, text, e));
    }

    /// Clear a cell, panicking on failure.
    pub fn clear(&mut self, a1: &str) {
        self.sheet
            .clear_cell(pos(a1))
            .unwrap_or_else(|e| panic!("clear {} failed: {}", a1, e));
    }

    /// Computed value of a cell; absent cells read as 0.
    pub fn value(&self, a1: &str) -> CellValue {
        self.sheet
            .get_cell(pos(a1))
            .unwrap()
            .map(|cell| cell.value(&self.sheet))
            .unwrap_or(CellValue::Number(0.0))
    }

    /// Source text of a cell; absent cells read as "".
    pub fn text(&self, a1: &str) -> String {
        self.sheet
            .get_cell(pos(a1))
            .unwrap()
            .map(|cell| cell.text())
            .unwrap_or_default()
    }

    /// Full `print_values` output as a string.
    pub fn values_output(&self) -> String {
        let mut out = Vec::new();
        self.sheet.print_values(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Full `print_texts` output as a string.
    pub fn texts_output(&self) -> String {
        let mut out = Vec::new();
        self.sheet.print_texts(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}

pub fn assert_cell_number(harness: &TestHarness, a1: &str, expected: f64) {
    assert_eq!(
        harness.value(a1),
        CellValue::Number(expected),
        "cell {}",
        a1
    );
}

pub fn assert_cell_text_value(harness: &TestHarness, a1: &str, expected: &str) {
    assert_eq!(
        harness.value(a1),
        CellValue::Text(expected.to_string()),
        "cell {}",
        a1
    );
}

pub fn assert_cell_error(harness: &TestHarness, a1: &str, expected: FormulaError) {
    assert_eq!(
        harness.value(a1),
        CellValue::Error(expected),
        "cell {}",
        a1
    );
}

pub fn assert_cell_empty(harness: &TestHarness, a1: &str) {
    assert_eq!(harness.text(a1), "", "cell {}", a1);
    assert_eq!(harness.value(a1), CellValue::Number(0.0), "cell {}", a1);
}
