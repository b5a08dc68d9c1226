//! Segregation Kernel: incremental Schelling relaxation on a square grid.
//!
//! Cells hold one of two agent types or nothing. Agents with too few like
//! neighbors in their Moore neighborhood relocate to random empty cells until
//! everyone is content or a step budget runs out.
//!
//! The [`CellTracker`] keeps the unhappy and empty sets current after each
//! move by re-evaluating only the cells whose neighborhood changed.

pub mod cell_set;
pub mod config;
pub mod error;
pub mod grid;
pub mod happiness;
pub mod neighborhood;
pub mod relaxation;
pub mod stats;
pub mod tracker;

pub use cell_set::CellSet;
pub use config::SimulationConfig;
pub use error::{ConfigError, GridError, InvariantViolation};
pub use grid::{Coord, Grid, Occupant};
pub use happiness::{CellStatus, Scan, is_happy, scan};
pub use neighborhood::neighbors;
pub use relaxation::{RunReport, Simulation, Termination};
pub use stats::Census;
pub use tracker::{CellTracker, Move, Relocation};
