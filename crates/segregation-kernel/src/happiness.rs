//! Happiness predicate: whether an agent has enough like neighbors to stay.
//!
//! The threshold is always passed in explicitly. A threshold above what a
//! cell's neighborhood can ever supply (e.g. 4 for a corner) leaves that cell
//! permanently unhappy; this is allowed.

use crate::grid::{Coord, Grid, Occupant};
use crate::neighborhood::neighbors;

/// Classification of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Empty,
    Happy,
    Unhappy,
}

/// Number of neighbors of `coord` holding the same occupant as `coord`.
pub fn same_type_neighbors(coord: Coord, grid: &Grid) -> usize {
    let occupant = grid.get(coord);
    neighbors(coord, grid.size())
        .filter(|&other| grid.get(other) == occupant)
        .count()
}

/// Whether the agent at `coord` is happy under `threshold`.
///
/// Only meaningful for occupied cells; use [`status`] when the cell may be
/// empty.
pub fn is_happy(coord: Coord, grid: &Grid, threshold: usize) -> bool {
    debug_assert!(
        grid.get(coord).is_occupied(),
        "happiness queried for empty cell {}",
        coord
    );
    same_type_neighbors(coord, grid) >= threshold
}

/// Classify `coord` against the current grid.
pub fn status(coord: Coord, grid: &Grid, threshold: usize) -> CellStatus {
    match grid.get(coord) {
        Occupant::Empty => CellStatus::Empty,
        _ if is_happy(coord, grid, threshold) => CellStatus::Happy,
        _ => CellStatus::Unhappy,
    }
}

/// Full-grid classification: every unhappy and every empty cell, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub unhappy: Vec<Coord>,
    pub empty: Vec<Coord>,
}

/// Classify every cell of `grid`. O(N²); used to seed the tracker and to
/// recompute statistics from a bare snapshot.
pub fn scan(grid: &Grid, threshold: usize) -> Scan {
    let mut out = Scan::default();
    for coord in grid.coords() {
        match status(coord, grid, threshold) {
            CellStatus::Empty => out.empty.push(coord),
            CellStatus::Unhappy => out.unhappy.push(coord),
            CellStatus::Happy => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_count() {
        let grid = Grid::parse(
            "AAB
             A.B
             BBB",
        )
        .unwrap();
        assert_eq!(same_type_neighbors(Coord::new(0, 0), &grid), 2);
        assert_eq!(same_type_neighbors(Coord::new(2, 2), &grid), 2);
        assert_eq!(same_type_neighbors(Coord::new(0, 2), &grid), 1);
    }

    #[test]
    fn test_threshold_boundary() {
        let grid = Grid::parse("AA\n..").unwrap();
        assert!(is_happy(Coord::new(0, 0), &grid, 1));
        assert!(!is_happy(Coord::new(0, 0), &grid, 2));
    }

    #[test]
    fn test_zero_threshold_always_happy() {
        let grid = Grid::parse("AB\nBA").unwrap();
        for coord in grid.coords() {
            assert!(is_happy(coord, &grid, 0));
        }
    }

    #[test]
    fn test_corner_unsatisfiable() {
        let grid = Grid::parse("AAA\nAAA\nAAA").unwrap();
        assert!(!is_happy(Coord::new(0, 0), &grid, 4));
        assert!(is_happy(Coord::new(1, 1), &grid, 4));
    }

    #[test]
    fn test_empty_neighbors_do_not_count() {
        let grid = Grid::parse("A.\n..").unwrap();
        assert_eq!(same_type_neighbors(Coord::new(0, 0), &grid), 0);
        assert_eq!(status(Coord::new(0, 0), &grid, 1), CellStatus::Unhappy);
        assert_eq!(status(Coord::new(0, 1), &grid, 1), CellStatus::Empty);
    }

    #[test]
    fn test_two_by_two_scenario() {
        // (0,0) sees (0,1) empty, (1,0) A, (1,1) empty.
        let grid = Grid::parse("A.\nA.").unwrap();
        let result = scan(&grid, 1);
        assert!(result.unhappy.is_empty());
        assert_eq!(result.empty, vec![Coord::new(0, 1), Coord::new(1, 1)]);
    }

    #[test]
    fn test_scan_classifies_all() {
        let grid = Grid::parse(
            "AB.
             BA.
             ...",
        )
        .unwrap();
        let result = scan(&grid, 1);
        // Each agent has exactly one like neighbor on the diagonal.
        assert!(result.unhappy.is_empty());
        assert_eq!(result.empty.len(), 5);

        let strict = scan(&grid, 2);
        assert_eq!(strict.unhappy.len(), 4);
    }
}
