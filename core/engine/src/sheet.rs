//! FILENAME: core/engine/src/sheet.rs
//! PURPOSE: Manages the collection of cells (The Spreadsheet Sheet).
//! CONTEXT: This file defines the `Sheet` struct, a sparse container of
//! cells that also owns the dependency graph between them. Every mutation
//! flows through `set_cell`/`clear_cell`, which keep three things in step:
//! the cell map, the graph (with its acyclicity guarantee), and the
//! memoized values of downstream formulas. Updates are transactional: a
//! rejected update leaves the sheet exactly as it was.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use parser::Position;

use crate::cell::Cell;
use crate::dependency_graph::DependencyGraph;
use crate::error::SheetError;

/// The printable extent of a sheet: the smallest rectangle anchored at
/// (0, 0) that covers every existing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: u32,
    pub cols: u32,
}

/// The sheet holds the spreadsheet state.
/// It uses a sparse representation (HashMap) mapping positions to Cells,
/// and keeps per-row/per-column occupancy counters so the printable size
/// stays an O(1) lookup as cells come and go.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    graph: DependencyGraph,
    row_counts: BTreeMap<u32, usize>,
    col_counts: BTreeMap<u32, usize>,
}

impl Sheet {
    /// Creates a new, empty Sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content of a cell from raw input text.
    ///
    /// The input is classified (empty, text, or '='-prefixed formula) and,
    /// for formulas, checked against the dependency graph before anything
    /// changes: an update that would close a reference cycle is rejected
    /// with `CircularDependency` and no observable side effects. On
    /// success, referents that do not exist yet are created as empty cells,
    /// the graph is rewired, the content installed, and every cached value
    /// downstream of this cell is dropped.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::invalid_position(pos));
        }

        let cell = Cell::from_input(text)?;
        let new_referents: HashSet<Position> = cell.referenced_cells().iter().copied().collect();

        if self.graph.would_create_cycle(pos, &new_referents) {
            log::debug!("rejected update of {}: would close a reference cycle", pos);
            return Err(SheetError::CircularDependency(pos));
        }

        for &referent in &new_referents {
            if !self.cells.contains_key(&referent) {
                self.insert_cell(referent, Cell::empty());
            }
        }

        self.graph.set_edges(pos, new_referents);
        self.insert_cell(pos, cell);
        self.invalidate_dependents(pos);
        Ok(())
    }

    /// Clears a cell.
    ///
    /// The cell's outgoing edges are dropped. If other formulas still read
    /// this position the cell stays in the map as an empty cell (they
    /// observe 0); otherwise it is removed entirely and the printable
    /// rectangle may shrink. Dependent caches are invalidated either way.
    /// Clearing an absent cell is a no-op.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::invalid_position(pos));
        }
        if !self.cells.contains_key(&pos) {
            return Ok(());
        }

        self.graph.clear_edges(pos);
        if self.graph.has_dependents(pos) {
            self.insert_cell(pos, Cell::empty());
        } else {
            self.remove_cell(pos);
        }
        self.invalidate_dependents(pos);
        Ok(())
    }

    /// Retrieves a reference to the cell at `pos`, or `None` if no cell
    /// exists there.
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>, SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::invalid_position(pos));
        }
        Ok(self.cells.get(&pos))
    }

    /// Bounds-unchecked lookup for formula evaluation, where positions are
    /// already known to be valid.
    pub(crate) fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// Returns the printable size, or (0, 0) for an empty sheet.
    pub fn printable_size(&self) -> Size {
        Size {
            rows: self.row_counts.keys().next_back().map_or(0, |row| row + 1),
            cols: self.col_counts.keys().next_back().map_or(0, |col| col + 1),
        }
    }

    /// Writes the computed values, one tab-separated line per printable row.
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |cell, sheet| cell.value(sheet).to_string())
    }

    /// Writes the source texts in the same layout as `print_values`.
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |cell, _| cell.text())
    }

    fn print_with<W: Write>(
        &self,
        out: &mut W,
        render: impl Fn(&Cell, &Sheet) -> String,
    ) -> io::Result<()> {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                if let Some(cell) = self.cells.get(&Position::new(row, col)) {
                    out.write_all(render(cell, self).as_bytes())?;
                }
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Drops the cached value of every cell downstream of `pos`.
    fn invalidate_dependents(&self, pos: Position) {
        let affected = self.graph.transitive_dependents(pos);
        for dependent in &affected {
            if let Some(cell) = self.cells.get(dependent) {
                cell.invalidate();
            }
        }
        if !affected.is_empty() {
            log::trace!(
                "invalidated {} cached value(s) downstream of {}",
                affected.len(),
                pos
            );
        }
    }

    /// Inserts or replaces a cell, bumping the occupancy counters only when
    /// the position was vacant.
    fn insert_cell(&mut self, pos: Position, cell: Cell) {
        match self.cells.entry(pos) {
            Entry::Occupied(mut entry) => {
                entry.insert(cell);
            }
            Entry::Vacant(entry) => {
                entry.insert(cell);
                *self.row_counts.entry(pos.row).or_insert(0) += 1;
                *self.col_counts.entry(pos.col).or_insert(0) += 1;
            }
        }
    }

    /// Removes a cell and shrinks the occupancy counters.
    fn remove_cell(&mut self, pos: Position) {
        if self.cells.remove(&pos).is_none() {
            return;
        }
        if let Some(count) = self.row_counts.get_mut(&pos.row) {
            *count -= 1;
            if *count == 0 {
                self.row_counts.remove(&pos.row);
            }
        }
        if let Some(count) = self.col_counts.get_mut(&pos.col) {
            *count -= 1;
            if *count == 0 {
                self.col_counts.remove(&pos.col);
            }
        }
    }
}
