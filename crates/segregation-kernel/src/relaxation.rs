//! The relaxation loop: relocate unhappy agents until none remain or the
//! step budget runs out.
//!
//! ## Usage
//!
//! ```
//! use segregation_kernel::{Grid, Simulation, Termination};
//!
//! let grid = Grid::parse("AB.\n.BA\nA.B").unwrap();
//! let mut sim = Simulation::seeded(grid, 1, 42);
//! let report = sim.run(Some(1_000));
//! assert!(report.steps <= 1_000);
//! if report.termination == Termination::Converged {
//!     assert_eq!(sim.census().unhappy, 0);
//! }
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::stats::Census;
use crate::tracker::{CellTracker, Relocation};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No unhappy agents remain.
    Converged,
    /// The step budget was used up with unhappy agents remaining.
    Exhausted,
    /// Unhappy agents remain but no cell is empty.
    Blocked,
}

/// Result of a call to [`Simulation::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Total relocations performed by the simulation so far.
    pub steps: u64,
    pub termination: Termination,
}

/// A grid, its tracker and the run's random source.
///
/// The grid is only reachable read-only from outside so the tracker can never
/// fall out of step with it.
#[derive(Debug, Clone)]
pub struct Simulation<R = ChaCha8Rng> {
    grid: Grid,
    tracker: CellTracker,
    rng: R,
    steps: u64,
}

impl Simulation<ChaCha8Rng> {
    /// Simulation driven by a ChaCha8 stream seeded with `seed`.
    pub fn seeded(grid: Grid, threshold: usize, seed: u64) -> Self {
        Self::new(grid, threshold, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Scan `grid` once and set up tracking.
    pub fn new(grid: Grid, threshold: usize, rng: R) -> Self {
        let tracker = CellTracker::new(&grid, threshold);
        debug!(
            size = grid.size(),
            threshold,
            unhappy = tracker.unhappy().len(),
            empty = tracker.empty().len(),
            "Initialized cell tracker"
        );
        Self {
            grid,
            tracker,
            rng,
            steps: 0,
        }
    }

    /// Validate `config` and check `grid` has its size, then build with its
    /// threshold.
    pub fn from_config(config: &SimulationConfig, grid: Grid, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.size() != config.size {
            return Err(ConfigError::SizeMismatch {
                expected: config.size,
                actual: grid.size(),
            });
        }
        Ok(Self::new(grid, config.threshold, rng))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tracker(&self) -> &CellTracker {
        &self.tracker
    }

    /// Relocations performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn threshold(&self) -> usize {
        self.tracker.threshold()
    }

    /// Live statistics from the tracker.
    pub fn census(&self) -> Census {
        self.tracker.census(&self.grid)
    }

    pub fn is_converged(&self) -> bool {
        self.tracker.unhappy().is_empty()
    }

    /// Perform one relocation. The step counter only advances on a move.
    pub fn step(&mut self) -> Relocation {
        let outcome = self.tracker.relocate_once(&mut self.grid, &mut self.rng);
        if outcome.moved() {
            self.steps += 1;
        }
        outcome
    }

    /// Run until convergence, a blocked grid, or `max_steps` total relocations.
    ///
    /// `None` means no budget; with an unsatisfiable threshold that never
    /// returns.
    pub fn run(&mut self, max_steps: Option<u64>) -> RunReport {
        self.run_with(max_steps, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `observer` with the simulation after
    /// every relocation.
    pub fn run_with<F>(&mut self, max_steps: Option<u64>, mut observer: F) -> RunReport
    where
        F: FnMut(&Self, &Relocation),
    {
        info!(
            max_steps = ?max_steps,
            unhappy = self.tracker.unhappy().len(),
            empty = self.tracker.empty().len(),
            "Starting relaxation"
        );

        let termination = loop {
            if self.is_converged() {
                break Termination::Converged;
            }
            if max_steps.is_some_and(|max| self.steps >= max) {
                break Termination::Exhausted;
            }

            let outcome = self.step();
            match outcome {
                Relocation::Moved(_) => observer(self, &outcome),
                Relocation::Converged => break Termination::Converged,
                Relocation::Blocked => break Termination::Blocked,
            }
        };

        info!(
            steps = self.steps,
            termination = ?termination,
            unhappy = self.tracker.unhappy().len(),
            "Relaxation finished"
        );

        RunReport {
            steps: self.steps,
            termination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupant;

    #[test]
    fn test_zero_threshold_no_steps() {
        let grid = Grid::parse("AB.\nBA.\n.BA").unwrap();
        let mut sim = Simulation::seeded(grid, 0, 1);
        let report = sim.run(Some(100));
        assert_eq!(report.steps, 0);
        assert_eq!(report.termination, Termination::Converged);
    }

    #[test]
    fn test_budget_exhausted() {
        // A corner can never see four like neighbors.
        let grid = Grid::parse(
            "A...
             ....
             ....
             ....",
        )
        .unwrap();
        let mut sim = Simulation::seeded(grid, 4, 9);
        let report = sim.run(Some(25));
        assert_eq!(report.steps, 25);
        assert_eq!(report.termination, Termination::Exhausted);
        assert!(!sim.is_converged());
    }

    #[test]
    fn test_budget_counts_total_steps() {
        let grid = Grid::parse("A..\n...\n...").unwrap();
        let mut sim = Simulation::seeded(grid, 1, 2);
        assert_eq!(sim.run(Some(5)).steps, 5);
        // A second run with the same budget has nothing left.
        let report = sim.run(Some(5));
        assert_eq!(report.steps, 5);
        assert_eq!(report.termination, Termination::Exhausted);
        assert_eq!(sim.run(Some(8)).steps, 8);
    }

    #[test]
    fn test_blocked_full_grid() {
        let grid = Grid::parse("AB\nBA").unwrap();
        let mut sim = Simulation::seeded(grid, 2, 0);
        let report = sim.run(None);
        assert_eq!(report.steps, 0);
        assert_eq!(report.termination, Termination::Blocked);
    }

    #[test]
    fn test_converges_small_grid() {
        // Two A agents on a 3x3 board with threshold 1 settle once adjacent.
        let grid = Grid::parse("A..\n...\n..A").unwrap();
        let mut sim = Simulation::seeded(grid, 1, 17);
        let report = sim.run(Some(10_000));
        assert_eq!(report.termination, Termination::Converged);
        assert_eq!(sim.census().unhappy, 0);
        assert_eq!(sim.grid().count(Occupant::TypeA), 2);
        sim.tracker().check_consistency(sim.grid()).unwrap();
    }

    #[test]
    fn test_observer_sees_every_move() {
        let grid = Grid::parse("A..\n...\n...").unwrap();
        let mut sim = Simulation::seeded(grid, 1, 4);
        let mut seen = 0u64;
        let report = sim.run_with(Some(12), |sim, outcome| {
            assert!(outcome.moved());
            assert_eq!(sim.grid().count(Occupant::TypeA), 1);
            seen += 1;
            assert_eq!(sim.steps(), seen);
        });
        assert_eq!(seen, report.steps);
    }

    #[test]
    fn test_from_config_validates() {
        let config = SimulationConfig {
            size: 0,
            ..Default::default()
        };
        let result = Simulation::from_config(
            &config,
            Grid::new(1),
            ChaCha8Rng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(ConfigError::ZeroSize)));
    }

    #[test]
    fn test_from_config_rejects_size_mismatch() {
        let config = SimulationConfig {
            size: 50,
            ..Default::default()
        };
        let result = Simulation::from_config(
            &config,
            Grid::parse("A.
..").unwrap(),
            ChaCha8Rng::seed_from_u64(0),
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::SizeMismatch {
                expected: 50,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_from_config_matching_size() {
        let config = SimulationConfig {
            size: 3,
            threshold: 1,
            ..Default::default()
        };
        let grid = Grid::parse("AB.
.BA
A.B").unwrap();
        let sim = Simulation::from_config(&config, grid, ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert_eq!(sim.threshold(), 1);
        assert_eq!(sim.grid().size(), 3);
    }
}
