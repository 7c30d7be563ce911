//! FILENAME: tests/test_sheet.rs
//! End-to-end tests for the sheet: update protocol, cycle rejection,
//! invalidation, auto-creation, and the printable projections.

mod common;

use common::{
    assert_cell_empty, assert_cell_error, assert_cell_number, assert_cell_text_value, pos,
    TestHarness,
};
use engine::{FormulaError, SheetError, Size};
use pretty_assertions::assert_eq;

#[test]
fn literal_arithmetic() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=1+2*3");

    assert_cell_number(&harness, "A1", 7.0);
    assert_eq!(harness.text("A1"), "=1+2*3");
}

#[test]
fn operator_printing_keeps_minimal_parens() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=(1+2)*3");
    harness.set("A2", "=1+(2+3)");
    harness.set("A3", "=1-(2-3)");
    harness.set("A4", "=1/(2*3)");

    assert_eq!(harness.text("A1"), "=(1+2)*3");
    assert_eq!(harness.text("A2"), "=1+2+3");
    assert_eq!(harness.text("A3"), "=1-(2-3)");
    assert_eq!(harness.text("A4"), "=1/(2*3)");
    assert_cell_number(&harness, "A1", 9.0);
}

#[test]
fn reference_and_coercion() {
    let mut harness = TestHarness::new();
    harness.set("A1", "hello");
    harness.set("A2", "=A1");
    assert_cell_error(&harness, "A2", FormulaError::Value);

    harness.set("A1", "3.5");
    assert_cell_number(&harness, "A2", 3.5);
}

#[test]
fn escaped_text_keeps_apostrophe_in_text_only() {
    let mut harness = TestHarness::new();
    harness.set("A1", "'=1+2");

    assert_cell_text_value(&harness, "A1", "=1+2");
    assert_eq!(harness.text("A1"), "'=1+2");

    // A numeric body behind the apostrophe still coerces.
    harness.set("B1", "'42");
    harness.set("B2", "=B1*2");
    assert_cell_number(&harness, "B2", 84.0);
}

#[test]
fn cycle_rejection_preserves_state() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=B1");
    harness.set("B1", "=C1");

    let texts_before = harness.texts_output();
    let values_before = harness.values_output();

    let result = harness.sheet.set_cell(pos("C1"), "=A1");
    assert!(matches!(result, Err(SheetError::CircularDependency(_))));

    assert_eq!(harness.texts_output(), texts_before);
    assert_eq!(harness.values_output(), values_before);

    // C1 is the empty cell B1's formula auto-created; the chain still works.
    assert_cell_empty(&harness, "C1");
    assert_cell_number(&harness, "A1", 0.0);
    assert_cell_number(&harness, "B1", 0.0);
}

#[test]
fn longer_cycle_is_rejected() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=B1+C1");
    harness.set("B1", "=D1*2");
    assert!(matches!(
        harness.sheet.set_cell(pos("D1"), "=1+A1"),
        Err(SheetError::CircularDependency(_))
    ));

    // The same formula is fine at an uninvolved position.
    harness.set("E1", "=1+A1");
    assert_cell_number(&harness, "E1", 1.0);
}

#[test]
fn invalidation_recomputes_lazily() {
    let mut harness = TestHarness::new();
    harness.set("A1", "1");
    harness.set("A2", "=A1+1");
    assert_cell_number(&harness, "A2", 2.0);

    harness.set("A1", "10");
    assert_cell_number(&harness, "A2", 11.0);
}

#[test]
fn invalidation_reaches_transitive_dependents() {
    let mut harness = TestHarness::with_arithmetic_chain();
    assert_cell_number(&harness, "A3", 3.0);

    harness.set("A1", "5");
    assert_cell_number(&harness, "A2", 6.0);
    assert_cell_number(&harness, "A3", 7.0);
}

#[test]
fn invalidation_covers_diamonds() {
    let mut harness = TestHarness::new();
    harness.set("A1", "1");
    harness.set("B1", "=A1*10");
    harness.set("B2", "=A1*100");
    harness.set("C1", "=B1+B2");
    assert_cell_number(&harness, "C1", 110.0);

    harness.set("A1", "2");
    assert_cell_number(&harness, "C1", 220.0);
}

#[test]
fn division_by_zero_and_overflow() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=1/0");
    harness.set("A2", "=1e308*10");
    harness.set("A3", "=1/0.0000001");

    assert_cell_error(&harness, "A1", FormulaError::Div0);
    assert_cell_error(&harness, "A2", FormulaError::Div0);
    assert_cell_error(&harness, "A3", FormulaError::Div0);
}

#[test]
fn error_values_propagate_and_recover() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=1/0");
    harness.set("A2", "=A1+1");
    assert_cell_error(&harness, "A2", FormulaError::Div0);

    // Fixing the upstream cell clears the downstream error lazily.
    harness.set("A1", "4");
    assert_cell_number(&harness, "A2", 5.0);
}

#[test]
fn auto_creation_of_referenced_cells() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=Z9");

    assert!(harness.sheet.get_cell(pos("Z9")).unwrap().is_some());
    assert_cell_empty(&harness, "Z9");
    assert_eq!(harness.sheet.printable_size(), Size { rows: 9, cols: 26 });
    assert_cell_number(&harness, "A1", 0.0);
}

#[test]
fn clearing_a_referenced_cell_reads_as_zero() {
    let mut harness = TestHarness::new();
    harness.set("A1", "1");
    harness.set("A2", "=A1+1");
    assert_cell_number(&harness, "A2", 2.0);

    harness.clear("A1");
    assert_cell_number(&harness, "A2", 1.0);
    assert_cell_empty(&harness, "A1");
}

#[test]
fn clearing_shrinks_printable_size() {
    let mut harness = TestHarness::new();
    harness.set("C3", "x");
    assert_eq!(harness.sheet.printable_size(), Size { rows: 3, cols: 3 });

    harness.clear("C3");
    assert_eq!(harness.sheet.printable_size(), Size { rows: 0, cols: 0 });
}

#[test]
fn printed_values_and_texts_fixture() {
    let mut harness = TestHarness::new();
    harness.set("A1", "2");
    harness.set("B1", "=A1*3");
    harness.set("A2", "'=verbatim");
    harness.set("C2", "=1/0");

    assert_eq!(harness.values_output(), "2\t6\t\n=verbatim\t\t#DIV/0!\n");
    assert_eq!(harness.texts_output(), "2\t=A1*3\t\n'=verbatim\t\t=1/0\n");
}

#[test]
fn rewiring_formula_to_text_releases_the_graph() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=B1");
    harness.set("A1", "plain");

    // With A1 no longer reading B1, the reverse edge must be legal.
    harness.set("B1", "=A1");
    assert_cell_error(&harness, "B1", FormulaError::Value);
}

#[test]
fn setting_empty_text_empties_the_cell() {
    let mut harness = TestHarness::new();
    harness.set("A1", "something");
    harness.set("A1", "");

    assert_cell_empty(&harness, "A1");
    // The cell was written through set_cell, so it still occupies the map.
    assert!(harness.sheet.get_cell(pos("A1")).unwrap().is_some());
}

#[test]
fn lone_equals_is_text() {
    let mut harness = TestHarness::new();
    harness.set("A1", "=");

    assert_eq!(harness.text("A1"), "=");
    assert_cell_text_value(&harness, "A1", "=");
}
