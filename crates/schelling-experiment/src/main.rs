//! Schelling Experiment CLI.
//!
//! Commands:
//! - single: Run one simulation and print before/after statistics
//! - batch: Repeat one configuration over several trials
//! - sweep: Run trials across a range of happiness thresholds
//! - generate: Populate and display a starting grid

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use schelling_experiment::experiment::{ExperimentRunner, ExperimentRunnerConfig};
use schelling_experiment::generator::{GeneratorConfig, GridGenerator, Scenario};
use schelling_experiment::results::{format_duration, BatchResults, ExperimentResult};
use segregation_kernel::{Census, SimulationConfig};

/// Generate a timestamped output path from the given path.
/// e.g., "results.json" -> "results-20260108-010530.json"
fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("results");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}-{}.{}", stem, timestamp, ext))
}

#[derive(Parser)]
#[command(name = "schelling-experiment")]
#[command(version)]
#[command(about = "Schelling segregation experiments")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Simulation parameters shared by every command.
#[derive(Args, Debug, Clone)]
struct SimArgs {
    /// JSON config file; flags given alongside override its values
    #[arg(long, env = "SCHELLING_CONFIG", conflicts_with = "scenario")]
    config: Option<PathBuf>,

    /// Preset: small, classic, crowded, sparse
    #[arg(long)]
    scenario: Option<String>,

    /// Grid side length
    #[arg(long)]
    size: Option<usize>,

    /// Share of cells holding type A
    #[arg(long)]
    fraction_a: Option<f64>,

    /// Share of cells holding type B
    #[arg(long)]
    fraction_b: Option<f64>,

    /// Minimum like neighbors for an agent to be happy
    #[arg(long)]
    threshold: Option<usize>,

    /// Relocation budget
    #[arg(long)]
    max_steps: Option<u64>,

    /// Run until convergence with no budget
    #[arg(long, conflicts_with = "max_steps")]
    unbounded: bool,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Record the unhappy count every this many relocations (0 disables)
    #[arg(long, default_value = "100")]
    sample_every: u64,
}

impl SimArgs {
    /// Merge config file or preset with explicit flags, then validate.
    fn resolve(&self) -> Result<SimulationConfig> {
        let mut config = match (&self.config, &self.scenario) {
            (Some(path), _) => SimulationConfig::load(path)?,
            (None, Some(name)) => Scenario::parse(name)?.config(),
            (None, None) => SimulationConfig::default(),
        };

        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(fraction_a) = self.fraction_a {
            config.fraction_a = fraction_a;
        }
        if let Some(fraction_b) = self.fraction_b {
            config.fraction_b = fraction_b;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if self.unbounded {
            config.max_steps = None;
        } else if let Some(max_steps) = self.max_steps {
            config.max_steps = Some(max_steps);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        config.validate().context("Invalid simulation parameters")?;
        Ok(config)
    }

    fn runner(&self, simulation: SimulationConfig, keep_snapshots: bool) -> ExperimentRunner {
        ExperimentRunner::new(ExperimentRunnerConfig {
            simulation,
            sample_every: self.sample_every,
            keep_snapshots,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation
    Single {
        #[command(flatten)]
        sim: SimArgs,

        /// Print the initial and final grids
        #[arg(long)]
        show_grid: bool,

        /// Write the result as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run repeated trials of one configuration
    Batch {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of trials
        #[arg(long, default_value = "10")]
        trials: usize,

        /// Output file for results
        #[arg(long, default_value = "results.json")]
        output: PathBuf,
    },

    /// Run trials across several thresholds
    Sweep {
        #[command(flatten)]
        sim: SimArgs,

        /// Thresholds to test (comma-separated)
        #[arg(long, default_value = "0,1,2,3,4,5", value_delimiter = ',')]
        thresholds: Vec<usize>,

        /// Number of trials per threshold
        #[arg(long, default_value = "5")]
        trials: usize,

        /// Output file for results
        #[arg(long, default_value = "sweep.json")]
        output: PathBuf,
    },

    /// Generate and display a starting grid
    Generate {
        #[command(flatten)]
        sim: SimArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Single {
            sim,
            show_grid,
            output,
        } => {
            let config = sim.resolve()?;
            let result = sim.runner(config, true).run(0, None)?;

            print_result(&result, show_grid);

            if let Some(output) = output {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&output, json)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("\nResult saved to: {}", output.display());
            }
        }

        Commands::Batch {
            sim,
            trials,
            output,
        } => {
            let config = sim.resolve()?;
            info!(
                trials,
                size = config.size,
                threshold = config.threshold,
                "Starting batch"
            );

            let runner = sim.runner(config.clone(), false);
            let mut results = BatchResults::new();
            for trial in 0..trials {
                let result = runner.run(trial, trial_seed(config.seed, trial))?;
                info!(
                    progress = format!("{}/{}", trial + 1, trials),
                    steps = result.steps,
                    termination = ?result.termination,
                    "Completed run"
                );
                results.add(result);
            }

            results.compute_summary();
            let output_path = timestamped_path(&output);
            results.save(&output_path)?;

            println!("\n=== Batch Complete ===");
            println!("Results saved to: {}", output_path.display());
            print_summary(&results);
        }

        Commands::Sweep {
            sim,
            thresholds,
            trials,
            output,
        } => {
            let base = sim.resolve()?;
            info!(
                trials,
                thresholds = ?thresholds,
                size = base.size,
                "Starting threshold sweep"
            );

            let total = thresholds.len() * trials;
            let mut completed = 0;
            let mut results = BatchResults::new();

            for &threshold in &thresholds {
                let config = SimulationConfig {
                    threshold,
                    ..base.clone()
                };
                let runner = sim.runner(config, false);

                for trial in 0..trials {
                    let result = runner.run(trial, trial_seed(base.seed, trial))?;
                    completed += 1;
                    info!(
                        progress = format!("{}/{}", completed, total),
                        threshold,
                        trial,
                        steps = result.steps,
                        "Completed run"
                    );
                    results.add(result);
                }
            }

            results.compute_summary();
            let output_path = timestamped_path(&output);
            results.save(&output_path)?;

            println!("\n=== Threshold Sweep Complete ===");
            println!("Results saved to: {}", output_path.display());
            print_summary(&results);
        }

        Commands::Generate { sim } => {
            let config = sim.resolve()?;
            let grid = GridGenerator::new(GeneratorConfig::from(&config)).generate()?;

            println!("{}", grid);
            println!("{}", Census::from_grid(&grid, config.threshold));
        }
    }

    Ok(())
}

/// Distinct seeds per trial when a base seed is set; drawn otherwise.
fn trial_seed(base: Option<u64>, trial: usize) -> Option<u64> {
    base.map(|seed| seed.wrapping_add(trial as u64))
}

fn print_result(result: &ExperimentResult, show_grid: bool) {
    let config = &result.config;

    println!("\n=== Experiment Result ===");
    println!(
        "Grid: {}x{} (A {:.0}%, B {:.0}%)",
        config.size,
        config.size,
        config.fraction_a * 100.0,
        config.fraction_b * 100.0
    );
    println!("Threshold: {}", config.threshold);
    println!("Seed: {}", result.seed);
    println!("Termination: {:?}", result.termination);
    println!("Steps: {}", result.steps);
    println!("Duration: {}", format_duration(result.duration_ms));

    println!("\nBefore: {}", result.before);
    println!("After:  {}", result.after);

    if show_grid {
        if let Some(rows) = &result.initial_grid {
            println!("\nInitial grid:");
            for row in rows {
                println!("{}", row);
            }
        }
        if let Some(rows) = &result.final_grid {
            println!("\nFinal grid:");
            for row in rows {
                println!("{}", row);
            }
        }
    }
}

fn print_summary(results: &BatchResults) {
    println!("\nSummary:");
    for (key, summary) in &results.summary {
        println!(
            "  {}: converged={:.1}% (±{:.1}), avg_steps={:.1}, final_unhappy={:.2}%",
            key,
            summary.convergence_rate * 100.0,
            summary.convergence_rate_se * 100.0,
            summary.avg_steps,
            summary.avg_final_unhappy_pct
        );
    }
}
