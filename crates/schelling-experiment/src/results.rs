//! Results collection and output for segregation experiments.
//!
//! Captures metrics like:
//! - Relocations until convergence (or budget exhaustion)
//! - Unhappy / happy / empty shares before and after
//! - Unhappy-count history sampled along the run
//! - Initial and final grid snapshots

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use segregation_kernel::{Census, Termination};

/// Results from a single experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Experiment configuration
    pub config: ExperimentConfig,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub ended_at: DateTime<Utc>,
    /// Wall-clock duration of population plus relaxation
    pub duration_ms: u64,
    /// Seed actually used (drawn when none was configured)
    pub seed: u64,
    /// Relocations performed
    pub steps: u64,
    /// Why the run stopped
    pub termination: Termination,
    /// Statistics of the initial grid
    pub before: Census,
    /// Statistics of the final grid
    pub after: Census,
    /// Unhappy count sampled along the run
    pub unhappy_history: Vec<HistoryPoint>,
    /// Initial grid, one string per row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_grid: Option<Vec<String>>,
    /// Final grid, one string per row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_grid: Option<Vec<String>>,
}

impl ExperimentResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Configuration for an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Grid size
    pub size: usize,
    /// Type-A fraction
    pub fraction_a: f64,
    /// Type-B fraction
    pub fraction_b: f64,
    /// Happiness threshold
    pub threshold: usize,
    /// Relocation budget (None = until converged)
    pub max_steps: Option<u64>,
    /// Trial number (for repeated experiments)
    pub trial: usize,
}

impl ExperimentConfig {
    /// Grouping key for summaries.
    pub fn key(&self) -> String {
        format!(
            "n={}:a={}:b={}:threshold={}",
            self.size, self.fraction_a, self.fraction_b, self.threshold
        )
    }
}

/// Unhappy count after a given number of relocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub step: u64,
    pub unhappy: usize,
}

/// Aggregate results from a batch or sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// All individual results
    pub results: Vec<ExperimentResult>,
    /// Summary statistics by configuration
    pub summary: BTreeMap<String, ConfigSummary>,
}

/// Summary statistics for a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub config_key: String,
    pub trials: usize,
    pub convergence_rate: f64,
    /// Standard error of convergence rate: sqrt(p(1-p)/n)
    pub convergence_rate_se: f64,
    /// 95% confidence interval for convergence rate: (lower, upper)
    pub convergence_rate_ci: (f64, f64),
    pub avg_steps: f64,
    /// Standard error of avg_steps
    pub avg_steps_se: f64,
    pub min_steps: u64,
    pub max_steps: u64,
    pub avg_final_unhappy_pct: f64,
    pub avg_final_happy_pct: f64,
}

impl BatchResults {
    /// Create a new empty result set.
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            summary: BTreeMap::new(),
        }
    }

    /// Add a result.
    pub fn add(&mut self, result: ExperimentResult) {
        self.results.push(result);
    }

    /// Compute summary statistics.
    pub fn compute_summary(&mut self) {
        let mut by_config: BTreeMap<String, Vec<&ExperimentResult>> = BTreeMap::new();
        for result in &self.results {
            by_config.entry(result.config.key()).or_default().push(result);
        }

        self.summary.clear();
        for (key, results) in by_config {
            let trials = results.len();
            let n = trials as f64;
            let converged_count = results.iter().filter(|r| r.converged()).count();
            let convergence_rate = converged_count as f64 / n;

            // Standard error for proportion: SE = sqrt(p(1-p)/n)
            let convergence_rate_se = if trials > 1 {
                (convergence_rate * (1.0 - convergence_rate) / n).sqrt()
            } else {
                0.0
            };

            // 95% CI: p ± 1.96 * SE, clamped to [0, 1]
            let z = 1.96;
            let convergence_rate_ci = (
                (convergence_rate - z * convergence_rate_se).max(0.0),
                (convergence_rate + z * convergence_rate_se).min(1.0),
            );

            let steps: Vec<f64> = results.iter().map(|r| r.steps as f64).collect();
            let avg_steps = steps.iter().sum::<f64>() / n;

            // Standard error for continuous: SE = std_dev / sqrt(n)
            let avg_steps_se = if trials > 1 {
                let variance =
                    steps.iter().map(|s| (s - avg_steps).powi(2)).sum::<f64>() / (n - 1.0);
                variance.sqrt() / n.sqrt()
            } else {
                0.0
            };

            let min_steps = results.iter().map(|r| r.steps).min().unwrap_or(0);
            let max_steps = results.iter().map(|r| r.steps).max().unwrap_or(0);

            let avg_final_unhappy_pct =
                results.iter().map(|r| r.after.unhappy_pct()).sum::<f64>() / n;
            let avg_final_happy_pct =
                results.iter().map(|r| r.after.happy_pct()).sum::<f64>() / n;

            self.summary.insert(
                key.clone(),
                ConfigSummary {
                    config_key: key,
                    trials,
                    convergence_rate,
                    convergence_rate_se,
                    convergence_rate_ci,
                    avg_steps,
                    avg_steps_se,
                    min_steps,
                    max_steps,
                    avg_final_unhappy_pct,
                    avg_final_happy_pct,
                },
            );
        }
    }

    /// Save results to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let results = serde_json::from_str(&json)?;
        Ok(results)
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a duration in milliseconds for display.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(trial: usize, steps: u64, termination: Termination) -> ExperimentResult {
        let unhappy = if termination == Termination::Converged { 0 } else { 10 };
        ExperimentResult {
            run_id: Uuid::new_v4(),
            config: ExperimentConfig {
                size: 10,
                fraction_a: 0.45,
                fraction_b: 0.45,
                threshold: 2,
                max_steps: Some(1_000),
                trial,
            },
            started_at: Utc::now(),
            ended_at: Utc::now(),
            duration_ms: 3,
            seed: trial as u64,
            steps,
            termination,
            before: Census::from_counts(100, 40, 10, 45, 45),
            after: Census::from_counts(100, unhappy, 10, 45, 45),
            unhappy_history: vec![HistoryPoint {
                step: 0,
                unhappy: 40,
            }],
            initial_grid: None,
            final_grid: None,
        }
    }

    #[test]
    fn test_batch_summary() {
        let mut results = BatchResults::new();
        results.add(sample_result(0, 100, Termination::Converged));
        results.add(sample_result(1, 200, Termination::Converged));
        results.add(sample_result(2, 1_000, Termination::Exhausted));

        results.compute_summary();

        let key = "n=10:a=0.45:b=0.45:threshold=2";
        let summary = results.summary.get(key).unwrap();

        assert_eq!(summary.trials, 3);
        assert!((summary.convergence_rate - 0.666).abs() < 0.01);
        assert!(summary.convergence_rate_se > 0.0);
        assert!(summary.convergence_rate_ci.0 <= summary.convergence_rate);
        assert!(summary.convergence_rate_ci.1 >= summary.convergence_rate);
        assert!((summary.avg_steps - 433.33).abs() < 0.01);
        assert_eq!(summary.min_steps, 100);
        assert_eq!(summary.max_steps, 1_000);
        assert!((summary.avg_final_unhappy_pct - 3.333).abs() < 0.01);
    }

    #[test]
    fn test_summary_single_trial_has_zero_se() {
        let mut results = BatchResults::new();
        results.add(sample_result(0, 50, Termination::Converged));
        results.compute_summary();

        let summary = results.summary.values().next().unwrap();
        assert_eq!(summary.convergence_rate, 1.0);
        assert_eq!(summary.convergence_rate_se, 0.0);
        assert_eq!(summary.avg_steps_se, 0.0);
    }

    #[test]
    fn test_summary_groups_by_threshold() {
        let mut results = BatchResults::new();
        let mut other = sample_result(0, 10, Termination::Converged);
        other.config.threshold = 3;
        results.add(sample_result(0, 10, Termination::Converged));
        results.add(other);
        results.compute_summary();
        assert_eq!(results.summary.len(), 2);
    }

    #[test]
    fn test_termination_serialized_snake_case() {
        let json = serde_json::to_string(&sample_result(0, 1, Termination::Exhausted)).unwrap();
        assert!(json.contains("\"termination\":\"exhausted\""));
        assert!(!json.contains("initial_grid"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(1_500), "1.5s");
        assert_eq!(format_duration(90_000), "1.5m");
    }
}
