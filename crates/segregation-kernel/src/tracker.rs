//! Cell-status tracker: the live unhappy and empty sets.
//!
//! The sets are built once with a full scan. After that each relocation only
//! re-evaluates the two cells it touched and their neighborhoods, so a step
//! costs O(neighborhood) instead of O(N²).
//!
//! Invariant, after every call to [`CellTracker::relocate_once`]:
//! - `empty` holds exactly the empty cells of the grid;
//! - `unhappy` holds exactly the occupied cells failing the happiness predicate.
//!
//! [`CellTracker::check_consistency`] verifies this against a rescan.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::trace;

use crate::cell_set::CellSet;
use crate::error::InvariantViolation;
use crate::grid::{Coord, Grid, Occupant};
use crate::happiness::{self, CellStatus};
use crate::neighborhood::neighbors;
use crate::stats::Census;

/// A single completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Cell the agent left; now empty.
    pub from: Coord,
    /// Cell the agent moved into.
    pub to: Coord,
    /// The agent that moved.
    pub occupant: Occupant,
    /// Whether the unhappy set is empty after this move.
    pub converged: bool,
}

/// Outcome of one relocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// An unhappy agent moved into an empty cell.
    Moved(Move),
    /// No unhappy agents; nothing to do.
    Converged,
    /// Unhappy agents remain but there is no empty cell to move into.
    Blocked,
}

impl Relocation {
    /// Whether the grid changed.
    pub fn moved(&self) -> bool {
        matches!(self, Relocation::Moved(_))
    }

    /// Whether no unhappy agents remain.
    pub fn is_converged(&self) -> bool {
        match self {
            Relocation::Moved(m) => m.converged,
            Relocation::Converged => true,
            Relocation::Blocked => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CellTracker {
    threshold: usize,
    unhappy: CellSet,
    empty: CellSet,
}

impl CellTracker {
    /// Build the sets from a full scan of `grid`.
    pub fn new(grid: &Grid, threshold: usize) -> Self {
        let scan = happiness::scan(grid, threshold);
        let mut unhappy = CellSet::new(grid.size());
        let mut empty = CellSet::new(grid.size());
        unhappy.extend(scan.unhappy);
        empty.extend(scan.empty);

        Self {
            threshold,
            unhappy,
            empty,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Currently unhappy occupied cells.
    pub fn unhappy(&self) -> &CellSet {
        &self.unhappy
    }

    /// Currently empty cells.
    pub fn empty(&self) -> &CellSet {
        &self.empty
    }

    /// Bring both sets in line with the grid for a single cell.
    ///
    /// Depends only on the current grid, so repeated calls are harmless.
    fn refresh(&mut self, coord: Coord, grid: &Grid) {
        match happiness::status(coord, grid, self.threshold) {
            CellStatus::Empty => {
                self.unhappy.remove(coord);
                self.empty.insert(coord);
            }
            CellStatus::Happy => {
                self.empty.remove(coord);
                self.unhappy.remove(coord);
            }
            CellStatus::Unhappy => {
                self.empty.remove(coord);
                self.unhappy.insert(coord);
            }
        }
    }

    /// Move one random unhappy agent to one random empty cell.
    ///
    /// Randomness is consumed in a fixed order: one draw over the unhappy set,
    /// then one draw over the empty set. Nothing is drawn when the outcome is
    /// [`Relocation::Converged`] or [`Relocation::Blocked`].
    pub fn relocate_once<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Relocation {
        if self.unhappy.is_empty() {
            return Relocation::Converged;
        }
        if self.empty.is_empty() {
            return Relocation::Blocked;
        }

        let (Some(from), Some(to)) = (self.unhappy.choose(rng), self.empty.choose(rng)) else {
            return Relocation::Converged;
        };

        Relocation::Moved(self.relocate(grid, from, to))
    }

    /// Move the agent at `from` (unhappy) into `to` (empty) and restore the
    /// set invariant.
    ///
    /// # Panics
    /// If `from` is not tracked as unhappy or `to` is not tracked as empty.
    pub fn relocate(&mut self, grid: &mut Grid, from: Coord, to: Coord) -> Move {
        assert!(self.unhappy.contains(from), "{} is not an unhappy cell", from);
        assert!(self.empty.contains(to), "{} is not an empty cell", to);

        grid.swap(from, to);
        let occupant = grid.get(to);

        // Re-evaluate only after the swap is fully applied. Each affected cell
        // is visited once even when the two neighborhoods overlap.
        let n = grid.size();
        let mut affected: Vec<Coord> = Vec::with_capacity(18);
        affected.push(from);
        affected.push(to);
        affected.extend(neighbors(from, n));
        affected.extend(neighbors(to, n));
        affected.sort_unstable();
        affected.dedup();

        for coord in affected {
            self.refresh(coord, grid);
        }

        let converged = self.unhappy.is_empty();
        trace!(
            %from,
            %to,
            ?occupant,
            unhappy = self.unhappy.len(),
            "Relocated agent"
        );

        Move {
            from,
            to,
            occupant,
            converged,
        }
    }

    /// Live counts, without scanning the grid.
    pub fn census(&self, grid: &Grid) -> Census {
        Census::from_counts(
            grid.cell_count(),
            self.unhappy.len(),
            self.empty.len(),
            grid.count(Occupant::TypeA),
            grid.count(Occupant::TypeB),
        )
    }

    /// Compare the sets against a full rescan of `grid`.
    pub fn check_consistency(&self, grid: &Grid) -> Result<(), InvariantViolation> {
        let scan = happiness::scan(grid, self.threshold);

        let (missing, unexpected) = diff(&scan.empty, &self.empty);
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(InvariantViolation::Empty {
                missing,
                unexpected,
            });
        }

        let (missing, unexpected) = diff(&scan.unhappy, &self.unhappy);
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(InvariantViolation::Unhappy {
                missing,
                unexpected,
            });
        }

        Ok(())
    }
}

/// `(expected - actual, actual - expected)`, both sorted.
fn diff(expected: &[Coord], actual: &CellSet) -> (Vec<Coord>, Vec<Coord>) {
    let expected: BTreeSet<Coord> = expected.iter().copied().collect();
    let actual: BTreeSet<Coord> = actual.iter().collect();
    (
        expected.difference(&actual).copied().collect(),
        actual.difference(&expected).copied().collect(),
    )
}
