//! Simulation parameters.
//!
//! Defaults match the reference driving setup: five rays over a
//! quarter turn, a `[5, 16, 8, 4]` network and thirty cars per generation.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::brain::{self, DEFAULT_WEIGHT_SCALE};
use super::error::{Error, Result};

/// Ray fan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// Number of rays, and the network's input size.
    pub ray_count: usize,
    /// Total field of view in radians.
    pub ray_spread: f32,
    /// Maximum ray length.
    pub ray_length: f32,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            ray_count: 5,
            ray_spread: std::f32::consts::FRAC_PI_2,
            ray_length: 150.0,
        }
    }
}

/// Rejects a mutation amount outside `[0, 1]`, NaN included.
pub(crate) fn check_rate(name: &str, rate: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::Configuration(format!(
            "{name} must be in [0, 1], got {rate}"
        )));
    }
    Ok(())
}

/// Selection and mutation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Fraction of the population kept unmutated, in `(0, 1]`.
    pub elite_fraction: f32,
    /// Mutation amount before any decay.
    pub base_mutation_rate: f32,
    /// Mutation amount removed per generation.
    pub decay_per_generation: f32,
    /// Floor for the decayed mutation amount.
    pub min_mutation_rate: f32,
    /// Mutation applied to copies when seeding from a saved champion.
    pub champion_mutation_rate: f32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            elite_fraction: 0.3,
            base_mutation_rate: 0.1,
            decay_per_generation: 0.005,
            min_mutation_rate: 0.01,
            champion_mutation_rate: 0.05,
        }
    }
}

impl EvolutionParams {
    /// Checks fractions and rates.
    pub fn validate(&self) -> Result<()> {
        if !(self.elite_fraction > 0.0 && self.elite_fraction <= 1.0) {
            return Err(Error::Configuration(format!(
                "elite fraction must be in (0, 1], got {}",
                self.elite_fraction
            )));
        }

        check_rate("base mutation rate", self.base_mutation_rate)?;
        check_rate("min mutation rate", self.min_mutation_rate)?;
        check_rate("champion mutation rate", self.champion_mutation_rate)?;

        if !(self.decay_per_generation.is_finite() && self.decay_per_generation >= 0.0) {
            return Err(Error::Configuration(format!(
                "mutation decay must be non-negative, got {}",
                self.decay_per_generation
            )));
        }
        Ok(())
    }
}

/// Top-level parameters for a fleet of learning agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Sensor fitted to every learning agent.
    pub sensor: SensorParams,
    /// Hidden layer sizes between the sensor and the controls.
    pub hidden_layers: Vec<usize>,
    /// Number of control outputs (forward, left, right, reverse).
    pub output_count: usize,
    /// Agents per generation.
    pub population_size: usize,
    /// Selection and mutation schedule.
    pub evolution: EvolutionParams,
    /// Half-width of the initial weight range.
    pub weight_scale: f32,
    /// Vehicle body width used for collision footprints.
    pub body_width: f32,
    /// Vehicle body length used for collision footprints.
    pub body_height: f32,
    /// Seed for reproducible runs; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            sensor: SensorParams::default(),
            hidden_layers: vec![16, 8],
            output_count: 4,
            population_size: 30,
            evolution: EvolutionParams::default(),
            weight_scale: DEFAULT_WEIGHT_SCALE,
            body_width: 30.0,
            body_height: 50.0,
            seed: None,
        }
    }
}

impl Params {
    /// Network topology: ray count, hidden layers, control outputs.
    pub fn topology(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.sensor.ray_count);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(self.output_count);
        sizes
    }

    /// Checks every field that would otherwise fail later.
    pub fn validate(&self) -> Result<()> {
        brain::validate_topology(&self.topology())?;
        self.evolution.validate()?;

        if !(self.weight_scale.is_finite() && self.weight_scale >= 0.0) {
            return Err(Error::Configuration(format!(
                "weight scale must be finite and non-negative, got {}",
                self.weight_scale
            )));
        }
        if !self.sensor.ray_spread.is_finite() {
            return Err(Error::Configuration(format!(
                "ray spread must be finite, got {}",
                self.sensor.ray_spread
            )));
        }

        if self.population_size == 0 {
            return Err(Error::Configuration(
                "population size must be positive".to_string(),
            ));
        }
        if !(self.sensor.ray_length.is_finite() && self.sensor.ray_length > 0.0) {
            return Err(Error::Configuration(format!(
                "ray length must be positive, got {}",
                self.sensor.ray_length
            )));
        }
        if !(self.body_width > 0.0 && self.body_height > 0.0) {
            return Err(Error::Configuration(format!(
                "body must have positive size, got {}x{}",
                self.body_width, self.body_height
            )));
        }
        Ok(())
    }

    /// Random source for a run, seeded when [`Params::seed`] is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Loads parameters from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Saves parameters to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
