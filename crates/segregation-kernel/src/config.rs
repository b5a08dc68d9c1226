//! Configuration types for a simulation run.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of one simulation run.
///
/// Loaded from JSON at runtime or built in code; optional fields fall back to
/// [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid side length (N)
    pub size: usize,

    /// Share of the N² cells holding type A, truncated to a whole count
    pub fraction_a: f64,

    /// Share of the N² cells holding type B, truncated to a whole count
    pub fraction_b: f64,

    /// Minimum like neighbors for an agent to be happy
    pub threshold: usize,

    /// Relocation budget. `None` runs until convergence
    pub max_steps: Option<u64>,

    /// Seed for the run's random source. `None` draws one
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: 50,
            fraction_a: 0.45,
            fraction_b: 0.45,
            threshold: 2, // more than one like neighbor
            max_steps: Some(1_000_000),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Check ranges before any state is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        for (name, value) in [("fraction_a", self.fraction_a), ("fraction_b", self.fraction_b)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        if self.fraction_a + self.fraction_b > 1.0 {
            return Err(ConfigError::FractionsExceedOne {
                fraction_a: self.fraction_a,
                fraction_b: self.fraction_b,
            });
        }
        Ok(())
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Agent counts `(type_a, type_b, empty)`.
    ///
    /// Each fraction is applied to N² independently and truncated, so the
    /// empty count can exceed its nominal share by up to two cells.
    pub fn population(&self) -> (usize, usize, usize) {
        let total = self.cell_count();
        let type_a = (total as f64 * self.fraction_a) as usize;
        let type_b = (total as f64 * self.fraction_b) as usize;
        (type_a, type_b, total - type_a - type_b)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid simulation config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zero_size_rejected() {
        let config = SimulationConfig {
            size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSize));
    }

    #[test]
    fn test_fraction_out_of_range() {
        let config = SimulationConfig {
            fraction_b: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                name: "fraction_b",
                ..
            })
        ));

        let config = SimulationConfig {
            fraction_a: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                name: "fraction_a",
                ..
            })
        ));
    }

    #[test]
    fn test_fractions_exceed_one() {
        let config = SimulationConfig {
            fraction_a: 0.6,
            fraction_b: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionsExceedOne { .. })
        ));
    }

    #[test]
    fn test_full_occupancy_allowed() {
        let config = SimulationConfig {
            fraction_a: 0.5,
            fraction_b: 0.5,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_population_truncates() {
        let config = SimulationConfig {
            size: 3,
            fraction_a: 0.45,
            fraction_b: 0.45,
            ..Default::default()
        };
        // 9 * 0.45 = 4.05 -> 4 each, 1 empty
        assert_eq!(config.population(), (4, 4, 1));

        let config = SimulationConfig {
            size: 10,
            fraction_a: 0.333,
            fraction_b: 0.333,
            ..Default::default()
        };
        // 33.3 -> 33 each, remainder 34
        assert_eq!(config.population(), (33, 33, 34));
    }

    #[test]
    fn test_from_json_defaults() {
        let config = SimulationConfig::from_json(r#"{"size": 20, "threshold": 3}"#).unwrap();
        assert_eq!(config.size, 20);
        assert_eq!(config.threshold, 3);
        assert_eq!(config.fraction_a, 0.45);
        assert_eq!(config.max_steps, Some(1_000_000));
    }

    #[test]
    fn test_from_json_unbounded() {
        let config =
            SimulationConfig::from_json(r#"{"max_steps": null, "seed": 42}"#).unwrap();
        assert_eq!(config.max_steps, None);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_from_json_validates() {
        let err = SimulationConfig::from_json(r#"{"fraction_a": 0.9, "fraction_b": 0.9}"#)
            .unwrap_err();
        assert!(err.to_string().contains("fractions sum"));
    }
}
