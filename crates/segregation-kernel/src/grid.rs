//! Grid types: the N×N board of occupants that relocations rearrange.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// What a single cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    Empty,
    TypeA,
    TypeB,
}

impl Occupant {
    /// Whether this cell holds an agent.
    pub fn is_occupied(self) -> bool {
        self != Occupant::Empty
    }

    /// Single-character rendering used by text grids.
    pub fn symbol(self) -> char {
        match self {
            Occupant::Empty => '.',
            Occupant::TypeA => 'A',
            Occupant::TypeB => 'B',
        }
    }

    /// Parse a symbol. Accepts the rendered form as well as numeric codes
    /// (`0` empty, `1` type A, `2` type B).
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' | '_' | '0' => Some(Occupant::Empty),
            'A' | 'a' | '1' => Some(Occupant::TypeA),
            'B' | 'b' | '2' => Some(Occupant::TypeB),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            Occupant::Empty => 0,
            Occupant::TypeA => 1,
            Occupant::TypeB => 2,
        }
    }
}

/// A cell position. Ordered row-major.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Square board of occupants, stored row-major.
///
/// Per-occupant counts are maintained on every write so conservation can be
/// checked without a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    n: usize,
    cells: Vec<Occupant>,
    counts: [usize; 3],
}

impl Grid {
    /// Create an all-empty `n`×`n` grid.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![Occupant::Empty; n * n],
            counts: [n * n, 0, 0],
        }
    }

    /// Build a grid from row-major cells. `cells.len()` must be a perfect square.
    pub fn from_cells(cells: Vec<Occupant>) -> Result<Self, GridError> {
        if cells.is_empty() {
            return Err(GridError::Empty);
        }
        let n = cells.len().isqrt();
        if n * n != cells.len() {
            return Err(GridError::NotPerfectSquare { len: cells.len() });
        }

        let mut counts = [0usize; 3];
        for cell in &cells {
            counts[cell.slot()] += 1;
        }
        Ok(Self { n, cells, counts })
    }

    /// Build a grid from explicit rows.
    pub fn from_rows(rows: Vec<Vec<Occupant>>) -> Result<Self, GridError> {
        let n = rows.len();
        if n == 0 {
            return Err(GridError::Empty);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != n {
                return Err(GridError::NotSquare {
                    row,
                    len: cells.len(),
                    expected: n,
                });
            }
        }
        Self::from_cells(rows.into_iter().flatten().collect())
    }

    /// Parse a text grid, one row per line, e.g. `"A.\nA."`.
    ///
    /// Blank lines and whitespace inside rows are ignored.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let rows = text
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, symbols)| {
                symbols
                    .into_iter()
                    .enumerate()
                    .map(|(col, symbol)| {
                        Occupant::from_symbol(symbol)
                            .ok_or(GridError::UnknownSymbol { symbol, row, col })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_rows(rows)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Total number of cells (N²).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `coord` lies on the board.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.n && coord.col < self.n
    }

    /// Row-major index of `coord`.
    ///
    /// # Panics
    /// If `coord` is out of range. The engine only generates in-bounds
    /// coordinates, so this is a programming error.
    pub fn index_of(&self, coord: Coord) -> usize {
        assert!(
            self.contains(coord),
            "coordinate {} out of range for {}x{} grid",
            coord,
            self.n,
            self.n
        );
        coord.row * self.n + coord.col
    }

    /// Occupant at `coord`. Panics when out of range.
    pub fn get(&self, coord: Coord) -> Occupant {
        self.cells[self.index_of(coord)]
    }

    /// Occupant at `coord`, or `None` when out of range.
    pub fn try_get(&self, coord: Coord) -> Option<Occupant> {
        self.contains(coord)
            .then(|| self.cells[coord.row * self.n + coord.col])
    }

    /// Overwrite the occupant at `coord`. Panics when out of range.
    pub fn set(&mut self, coord: Coord, occupant: Occupant) {
        let idx = self.index_of(coord);
        let old = std::mem::replace(&mut self.cells[idx], occupant);
        self.counts[old.slot()] -= 1;
        self.counts[occupant.slot()] += 1;
    }

    /// Exchange the occupants of two cells. Counts are unchanged.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let ia = self.index_of(a);
        let ib = self.index_of(b);
        self.cells.swap(ia, ib);
    }

    /// Number of cells holding `occupant`.
    pub fn count(&self, occupant: Occupant) -> usize {
        self.counts[occupant.slot()]
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let n = self.n;
        (0..n).flat_map(move |row| (0..n).map(move |col| Coord::new(row, col)))
    }

    /// Row-major view of the raw cells.
    pub fn cells(&self) -> &[Occupant] {
        &self.cells
    }

    /// Text snapshot, one string per row.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.n.max(1))
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
