//! Error types for the segregation kernel.

use thiserror::Error;

use crate::grid::Coord;

/// Rejected simulation configuration.
///
/// Reported before any grid or tracker state is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Grid size must be at least 1.
    #[error("grid size must be positive")]
    ZeroSize,

    /// A population fraction is outside `[0, 1]` or not finite.
    #[error("{name} must be within [0, 1], got {value}")]
    FractionOutOfRange {
        /// Which fraction was rejected.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The two population fractions leave a negative empty share.
    #[error("fractions sum to more than 1: {fraction_a} + {fraction_b}")]
    FractionsExceedOne {
        /// Type-A fraction.
        fraction_a: f64,
        /// Type-B fraction.
        fraction_b: f64,
    },

    /// The grid handed to a simulation is not the configured size.
    #[error("grid is {actual}x{actual}, config expects {expected}x{expected}")]
    SizeMismatch {
        /// Configured side length.
        expected: usize,
        /// Side length of the supplied grid.
        actual: usize,
    },
}

/// Failure to build a grid from rows or text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// No rows were supplied.
    #[error("grid has no rows")]
    Empty,

    /// A row length differs from the number of rows.
    #[error("grid is not square: row {row} has {len} cells, expected {expected}")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Its length.
        len: usize,
        /// Expected length (the row count).
        expected: usize,
    },

    /// A flat cell list whose length is not a perfect square.
    #[error("{len} cells do not form a square grid")]
    NotPerfectSquare {
        /// Number of cells supplied.
        len: usize,
    },

    /// A character that does not name an occupant.
    #[error("unknown cell symbol {symbol:?} at ({row}, {col})")]
    UnknownSymbol {
        /// The symbol found.
        symbol: char,
        /// Row of the symbol.
        row: usize,
        /// Column of the symbol.
        col: usize,
    },
}

/// Tracker state that disagrees with a full rescan of the grid.
///
/// This only ever indicates a defect in the incremental update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The unhappy set differs from the rescanned one.
    #[error("unhappy set out of sync: missing {missing:?}, unexpected {unexpected:?}")]
    Unhappy {
        /// Unhappy cells the tracker does not hold.
        missing: Vec<Coord>,
        /// Cells the tracker holds that are not unhappy.
        unexpected: Vec<Coord>,
    },

    /// The empty set differs from the rescanned one.
    #[error("empty set out of sync: missing {missing:?}, unexpected {unexpected:?}")]
    Empty {
        /// Empty cells the tracker does not hold.
        missing: Vec<Coord>,
        /// Cells the tracker holds that are occupied.
        unexpected: Vec<Coord>,
    },
}
