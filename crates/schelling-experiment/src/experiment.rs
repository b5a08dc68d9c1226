//! Experiment runner for segregation runs.
//!
//! Orchestrates the experiment lifecycle:
//! 1. Resolve the seed and populate the initial grid
//! 2. Record starting statistics
//! 3. Relax until converged, blocked, or out of budget
//! 4. Collect metrics and results

use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use uuid::Uuid;

use segregation_kernel::{Census, Simulation, SimulationConfig, Termination};

use crate::generator::{GeneratorConfig, GridGenerator};
use crate::results::{ExperimentConfig, ExperimentResult, HistoryPoint};

/// Configuration for the experiment runner.
#[derive(Debug, Clone)]
pub struct ExperimentRunnerConfig {
    /// Simulation parameters
    pub simulation: SimulationConfig,
    /// Record the unhappy count every this many relocations (0 disables)
    pub sample_every: u64,
    /// Keep initial and final grid snapshots in the result
    pub keep_snapshots: bool,
}

impl Default for ExperimentRunnerConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            sample_every: 100,
            keep_snapshots: true,
        }
    }
}

/// Runs single experiments from a fixed configuration.
pub struct ExperimentRunner {
    config: ExperimentRunnerConfig,
}

impl ExperimentRunner {
    /// Create a new runner with the given configuration.
    pub fn new(config: ExperimentRunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExperimentRunnerConfig {
        &self.config
    }

    /// Run one trial.
    ///
    /// `seed` overrides the configured seed; with neither, a seed is drawn and
    /// recorded in the result.
    pub fn run(&self, trial: usize, seed: Option<u64>) -> Result<ExperimentResult> {
        let sim_config = &self.config.simulation;
        sim_config.validate()?;

        let seed = seed
            .or(sim_config.seed)
            .unwrap_or_else(|| rand::rng().random());
        debug!(trial, seed, "Resolved run seed");

        let started_at = Utc::now();
        let clock = Instant::now();

        // One stream for both population and relocation.
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = GridGenerator::new(GeneratorConfig::from(sim_config)).generate_with(&mut rng)?;

        let initial_grid = self.config.keep_snapshots.then(|| grid.rows());
        let before = Census::from_grid(&grid, sim_config.threshold);

        info!(
            trial,
            size = sim_config.size,
            threshold = sim_config.threshold,
            unhappy = before.unhappy,
            empty = before.empty,
            "Starting experiment"
        );

        let mut sim = Simulation::from_config(sim_config, grid, rng)?;
        let mut unhappy_history = vec![HistoryPoint {
            step: 0,
            unhappy: before.unhappy,
        }];

        let sample_every = self.config.sample_every;
        let report = sim.run_with(sim_config.max_steps, |sim, _| {
            if sample_every > 0 && sim.steps() % sample_every == 0 {
                unhappy_history.push(HistoryPoint {
                    step: sim.steps(),
                    unhappy: sim.tracker().unhappy().len(),
                });
            }
        });

        let after = sim.census();
        if unhappy_history.last().map(|p| p.step) != Some(report.steps) {
            unhappy_history.push(HistoryPoint {
                step: report.steps,
                unhappy: after.unhappy,
            });
        }

        let ended_at = Utc::now();
        let duration_ms = clock.elapsed().as_millis() as u64;

        match report.termination {
            Termination::Converged => info!(trial, steps = report.steps, "Converged"),
            Termination::Exhausted => info!(
                trial,
                steps = report.steps,
                unhappy = after.unhappy,
                "Step budget exhausted"
            ),
            Termination::Blocked => info!(
                trial,
                unhappy = after.unhappy,
                "Blocked: no empty cells to move into"
            ),
        }

        let final_grid = self.config.keep_snapshots.then(|| sim.grid().rows());

        Ok(ExperimentResult {
            run_id: Uuid::new_v4(),
            config: ExperimentConfig {
                size: sim_config.size,
                fraction_a: sim_config.fraction_a,
                fraction_b: sim_config.fraction_b,
                threshold: sim_config.threshold,
                max_steps: sim_config.max_steps,
                trial,
            },
            started_at,
            ended_at,
            duration_ms,
            seed,
            steps: report.steps,
            termination: report.termination,
            before,
            after,
            unhappy_history,
            initial_grid,
            final_grid,
        })
    }
}
