//! Moore neighborhood: the up to eight cells around a coordinate.
//!
//! Edges are truncated, never wrapped: corner cells have three neighbors and
//! border cells five.

use crate::grid::Coord;

/// Row/column offsets of the eight surrounding cells, in iteration order.
pub const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds neighbors of `coord` on an `n`×`n` grid.
///
/// Yields them in [`OFFSETS`] order.
pub fn neighbors(coord: Coord, n: usize) -> impl Iterator<Item = Coord> {
    OFFSETS.iter().filter_map(move |&(dr, dc)| {
        let row = coord.row.checked_add_signed(dr)?;
        let col = coord.col.checked_add_signed(dc)?;
        (row < n && col < n).then_some(Coord::new(row, col))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(coord: Coord, n: usize) -> Vec<Coord> {
        let mut out: Vec<_> = neighbors(coord, n).collect();
        out.sort();
        out
    }

    #[test]
    fn test_corner_has_three() {
        assert_eq!(
            sorted(Coord::new(0, 0), 3),
            vec![Coord::new(0, 1), Coord::new(1, 0), Coord::new(1, 1)]
        );
    }

    #[test]
    fn test_center_has_eight() {
        let found = sorted(Coord::new(1, 1), 3);
        assert_eq!(found.len(), 8);
        assert!(!found.contains(&Coord::new(1, 1)));
    }

    #[test]
    fn test_edge_has_five() {
        assert_eq!(neighbors(Coord::new(0, 1), 3).count(), 5);
        assert_eq!(neighbors(Coord::new(1, 2), 3).count(), 5);
    }

    #[test]
    fn test_no_wraparound() {
        let found = sorted(Coord::new(2, 2), 3);
        assert_eq!(
            found,
            vec![Coord::new(1, 1), Coord::new(1, 2), Coord::new(2, 1)]
        );
    }

    #[test]
    fn test_single_cell_grid() {
        assert_eq!(neighbors(Coord::new(0, 0), 1).count(), 0);
    }

    #[test]
    fn test_order_is_deterministic() {
        let first: Vec<_> = neighbors(Coord::new(4, 4), 10).collect();
        let second: Vec<_> = neighbors(Coord::new(4, 4), 10).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], Coord::new(3, 3));
        assert_eq!(first[7], Coord::new(5, 5));
    }
}
