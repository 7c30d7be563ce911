//! FILENAME: core/engine/src/dependency_graph.rs
//! PURPOSE: Implements the Directed Acyclic Graph (DAG) for tracking cell dependencies.
//! CONTEXT: This module is the heart of the sheet's consistency machinery.
//! It tracks which cells a formula reads (referents) and which formulas
//! read a given cell (dependents), answers "would this edge set close a
//! cycle?" before an update commits, and enumerates the transitive
//! dependents whose caches an update must drop.
//!
//! TERMINOLOGY:
//! - Referents: Cells a formula cell reads (its inputs).
//!   If A3 = A1 + A2, then A1 and A2 are referents of A3.
//! - Dependents: Cells whose formula reads a given cell (reverse lookup).
//!   If A3 = A1 + A2, then A3 is a dependent of A1 and A2.
//!
//! USAGE:
//! 1. Call `would_create_cycle()` with a cell's prospective referents
//!    before committing a content change.
//! 2. On commit, call `set_edges()` (or `clear_edges()` for non-formula
//!    content) to rewire the graph.
//! 3. Call `transitive_dependents()` to find every cell whose cached value
//!    the change may have stale-ed.

use std::collections::{HashMap, HashSet, VecDeque};

use parser::Position;

/// The dependency graph tracks relationships between cells.
/// It maintains both forward (referents) and reverse (dependents) mappings
/// for efficient lookups in either direction.
///
/// Invariants: the two maps mirror each other edge for edge, and no empty
/// set is ever stored.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// For each formula cell, the set of cells its formula reads.
    /// If A3 = A1 + A2, then referents[A3] = {A1, A2}.
    referents: HashMap<Position, HashSet<Position>>,

    /// For each cell, the set of formula cells that read it.
    /// If A3 = A1 + A2, then dependents[A1] and dependents[A2] contain A3.
    dependents: HashMap<Position, HashSet<Position>>,
}

impl DependencyGraph {
    /// Creates a new, empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the outgoing edges of a cell, updating both mappings.
    ///
    /// The cell's previous edges (if any) are removed first, so this is the
    /// single mutation point that keeps the two maps mirrored. Passing an
    /// empty set is equivalent to `clear_edges`.
    ///
    /// This does NOT check for cycles. Use `would_create_cycle()` first.
    pub fn set_edges(&mut self, cell: Position, new_referents: HashSet<Position>) {
        self.clear_edges(cell);

        if new_referents.is_empty() {
            return;
        }

        for &referent in &new_referents {
            self.dependents.entry(referent).or_default().insert(cell);
        }

        self.referents.insert(cell, new_referents);
    }

    /// Removes all outgoing edges of a cell.
    /// Call this when a cell stops being a formula or is cleared.
    pub fn clear_edges(&mut self, cell: Position) {
        if let Some(old_referents) = self.referents.remove(&cell) {
            for referent in old_referents {
                if let Some(deps) = self.dependents.get_mut(&referent) {
                    deps.remove(&cell);
                    // Clean up empty sets
                    if deps.is_empty() {
                        self.dependents.remove(&referent);
                    }
                }
            }
        }
    }

    /// Returns the direct referents of a cell (cells its formula reads).
    pub fn referents_of(&self, cell: Position) -> Option<&HashSet<Position>> {
        self.referents.get(&cell)
    }

    /// Returns the direct dependents of a cell (formulas that read it).
    pub fn dependents_of(&self, cell: Position) -> Option<&HashSet<Position>> {
        self.dependents.get(&cell)
    }

    /// Returns true if at least one formula currently reads this cell.
    pub fn has_dependents(&self, cell: Position) -> bool {
        self.dependents.contains_key(&cell)
    }

    /// Checks whether giving `cell` the outgoing edges `new_referents`
    /// would close a directed cycle.
    ///
    /// The check runs on the prospective graph: `cell`'s existing outgoing
    /// edges are ignored (they are about to be replaced) and the DFS starts
    /// with the new ones. A cycle exists exactly when `cell` can reach
    /// itself that way, which includes the trivial self-reference.
    pub fn would_create_cycle(&self, cell: Position, new_referents: &HashSet<Position>) -> bool {
        if new_referents.contains(&cell) {
            return true;
        }

        new_referents
            .iter()
            .any(|&referent| self.can_reach(referent, cell))
    }

    /// Checks if `start` can reach `target` by following referent chains.
    ///
    /// The search never needs to walk through `target` itself, so stale
    /// outgoing edges of the cell being rewired cannot distort the answer.
    fn can_reach(&self, start: Position, target: Position) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(referents) = self.referents.get(&current) {
                stack.extend(referents.iter().copied().filter(|r| !visited.contains(r)));
            }
        }

        false
    }

    /// Returns every cell that transitively depends on `cell` (not
    /// including `cell` itself), breadth first over the dependents map.
    ///
    /// Termination is guaranteed by acyclicity; the visited set only saves
    /// repeated work on diamonds.
    pub fn transitive_dependents(&self, cell: Position) -> HashSet<Position> {
        let mut reached = HashSet::new();
        let mut queue: VecDeque<Position> = self
            .dependents
            .get(&cell)
            .into_iter()
            .flatten()
            .copied()
            .collect();

        while let Some(current) = queue.pop_front() {
            if !reached.insert(current) {
                continue;
            }
            if let Some(deps) = self.dependents.get(&current) {
                queue.extend(deps.iter().copied().filter(|d| !reached.contains(d)));
            }
        }

        reached
    }

    /// Check the mirroring and no-empty-sets invariants. Panics if violated.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for (cell, referents) in &self.referents {
            assert!(!referents.is_empty(), "Empty referent set stored for {}", cell);
            for referent in referents {
                assert!(
                    self.dependents
                        .get(referent)
                        .map_or(false, |deps| deps.contains(cell)),
                    "Missing dependent edge: {} should list {}",
                    referent,
                    cell
                );
            }
        }
        for (cell, dependents) in &self.dependents {
            assert!(!dependents.is_empty(), "Empty dependent set stored for {}", cell);
            for dependent in dependents {
                assert!(
                    self.referents
                        .get(dependent)
                        .map_or(false, |refs| refs.contains(cell)),
                    "Missing referent edge: {} should list {}",
                    dependent,
                    cell
                );
            }
        }
    }
}
