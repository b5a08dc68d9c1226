//! Initial grid generator.
//!
//! Places `N²·fraction` agents of each type (truncated) and leaves the rest
//! empty, using a uniform shuffle of all cells.

use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use segregation_kernel::{Grid, Occupant, SimulationConfig};

/// Configuration for grid generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Grid size (n x n)
    pub n: usize,
    /// Share of cells holding type A
    pub fraction_a: f64,
    /// Share of cells holding type B
    pub fraction_b: f64,
    /// Random seed for reproducibility (None for random)
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n: 50,
            fraction_a: 0.45,
            fraction_b: 0.45,
            seed: None,
        }
    }
}

impl From<&SimulationConfig> for GeneratorConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            n: config.size,
            fraction_a: config.fraction_a,
            fraction_b: config.fraction_b,
            seed: config.seed,
        }
    }
}

impl GeneratorConfig {
    fn as_simulation(&self) -> SimulationConfig {
        SimulationConfig {
            size: self.n,
            fraction_a: self.fraction_a,
            fraction_b: self.fraction_b,
            ..Default::default()
        }
    }
}

/// Populates starting grids.
pub struct GridGenerator {
    config: GeneratorConfig,
}

impl GridGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate a grid drawing from `rng`.
    ///
    /// The runner passes its own run source here so that population and
    /// relocation share one seeded stream.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Grid> {
        let config = self.config.as_simulation();
        config.validate()?;

        let (type_a, type_b, empty) = config.population();
        let mut cells = Vec::with_capacity(config.cell_count());
        cells.extend(std::iter::repeat_n(Occupant::TypeA, type_a));
        cells.extend(std::iter::repeat_n(Occupant::TypeB, type_b));
        cells.extend(std::iter::repeat_n(Occupant::Empty, empty));
        cells.shuffle(rng);

        Ok(Grid::from_cells(cells)?)
    }

    /// Generate a grid from the configured seed, or a fresh one.
    pub fn generate(&self) -> Result<Grid> {
        let mut rng: Box<dyn RngCore> = match self.config.seed {
            Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        };
        self.generate_with(&mut rng)
    }

    /// Generate multiple grids from one stream.
    pub fn generate_batch(&self, count: usize) -> Result<Vec<Grid>> {
        let mut rng: Box<dyn RngCore> = match self.config.seed {
            Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        };
        (0..count).map(|_| self.generate_with(&mut rng)).collect()
    }
}

/// Ready-made experiment setups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario {
    /// 10x10, 45% / 45%, threshold 2
    Small,
    /// 50x50, 45% / 45%, threshold 2
    Classic,
    /// 50x50, 49% / 49%, threshold 3: almost no room to move
    Crowded,
    /// 50x50, 30% / 30%, threshold 3
    Sparse,
    /// Custom setup
    Custom {
        size: usize,
        fraction_a: f64,
        fraction_b: f64,
        threshold: usize,
    },
}

impl Scenario {
    /// Get the simulation config for this scenario.
    pub fn config(self) -> SimulationConfig {
        let (size, fraction_a, fraction_b, threshold) = match self {
            Scenario::Small => (10, 0.45, 0.45, 2),
            Scenario::Classic => (50, 0.45, 0.45, 2),
            Scenario::Crowded => (50, 0.49, 0.49, 3),
            Scenario::Sparse => (50, 0.30, 0.30, 3),
            Scenario::Custom {
                size,
                fraction_a,
                fraction_b,
                threshold,
            } => (size, fraction_a, fraction_b, threshold),
        };
        SimulationConfig {
            size,
            fraction_a,
            fraction_b,
            threshold,
            ..Default::default()
        }
    }

    /// Create a generator for this scenario.
    pub fn generator(self) -> GridGenerator {
        GridGenerator::new(GeneratorConfig::from(&self.config()))
    }

    /// Parse a preset name.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "small" => Ok(Scenario::Small),
            "classic" | "default" => Ok(Scenario::Classic),
            "crowded" | "dense" => Ok(Scenario::Crowded),
            "sparse" => Ok(Scenario::Sparse),
            _ => anyhow::bail!(
                "Unknown scenario: {}. Valid: small, classic, crowded, sparse",
                name
            ),
        }
    }
}
