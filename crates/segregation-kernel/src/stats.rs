//! Population statistics: unhappy / happy / empty shares of the grid.
//!
//! A [`Census`] can come from the live tracker (O(1)) or from a bare grid
//! snapshot via a full scan; the two always agree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Occupant};
use crate::happiness;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub total: usize,
    pub unhappy: usize,
    pub happy: usize,
    pub empty: usize,
    pub type_a: usize,
    pub type_b: usize,
}

impl Census {
    /// Assemble from raw counts. `happy` is derived as the remainder and
    /// bottoms out at zero when `unhappy + empty` exceeds `total`.
    pub fn from_counts(
        total: usize,
        unhappy: usize,
        empty: usize,
        type_a: usize,
        type_b: usize,
    ) -> Self {
        Self {
            total,
            unhappy,
            happy: total.saturating_sub(unhappy).saturating_sub(empty),
            empty,
            type_a,
            type_b,
        }
    }

    /// Recompute everything from a grid snapshot.
    pub fn from_grid(grid: &Grid, threshold: usize) -> Self {
        let scan = happiness::scan(grid, threshold);
        Self::from_counts(
            grid.cell_count(),
            scan.unhappy.len(),
            scan.empty.len(),
            grid.count(Occupant::TypeA),
            grid.count(Occupant::TypeB),
        )
    }

    fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total as f64
    }

    pub fn unhappy_pct(&self) -> f64 {
        self.percent(self.unhappy)
    }

    pub fn happy_pct(&self) -> f64 {
        self.percent(self.happy)
    }

    pub fn empty_pct(&self) -> f64 {
        self.percent(self.empty)
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unhappy {:.2}% | happy {:.2}% | empty {:.2}%",
            self.unhappy_pct(),
            self.happy_pct(),
            self.empty_pct()
        )
    }
}
