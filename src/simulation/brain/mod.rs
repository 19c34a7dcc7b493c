//! Feedforward network used as an agent's brain and as the unit of selection.
//!
//! The topology is fixed when the network is built. Mutation nudges every
//! parameter in place; cloning makes a fully independent copy.

use std::path::Path;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{Error, Result};

pub mod layer;

pub use layer::Layer;

/// Default half-width of the range initial weights and biases are drawn from.
pub const DEFAULT_WEIGHT_SCALE: f32 = 1.0;

/// Activation applied to every unit of every layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// `1` if the pre-activation is strictly positive, `0` otherwise.
    #[default]
    Step,
    /// Hyperbolic tangent.
    Tanh,
}

impl Activation {
    /// Applies the activation to a pre-activation value.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Step => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Checks that `layer_sizes` describes a buildable network.
///
/// At least two sizes are needed and none may be zero.
pub fn validate_topology(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(Error::Configuration(format!(
            "topology needs at least 2 layer sizes, got {}",
            layer_sizes.len()
        )));
    }
    if let Some(pos) = layer_sizes.iter().position(|&size| size == 0) {
        return Err(Error::Configuration(format!(
            "layer size at position {pos} is zero"
        )));
    }
    Ok(())
}

/// A feedforward network: ordered layers from sensor inputs to control outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkData")]
pub struct Network {
    /// Ordered layers from input to output.
    layers: Vec<Layer>,
    /// Activation used by every layer.
    activation: Activation,
}

/// Unchecked form of [`Network`] read from persisted data.
#[derive(Deserialize)]
struct NetworkData {
    layers: Vec<Layer>,
    #[serde(default)]
    activation: Activation,
}

impl TryFrom<NetworkData> for Network {
    type Error = Error;

    fn try_from(data: NetworkData) -> Result<Self> {
        Network::from_layers(data.layers, data.activation)
    }
}

impl Network {
    /// Creates a network with weights and biases uniform in `[-1, 1]`.
    ///
    /// # Arguments
    ///
    /// * `layer_sizes` - Topology, e.g. `[ray_count, 16, 8, 4]`
    /// * `rng` - Random source for the initial parameters
    pub fn new<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        Self::with_scale(layer_sizes, DEFAULT_WEIGHT_SCALE, rng)
    }

    /// Creates a network with weights and biases uniform in `[-scale, scale]`.
    pub fn with_scale<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        scale: f32,
        rng: &mut R,
    ) -> Result<Self> {
        validate_topology(layer_sizes)?;
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(Error::Configuration(format!(
                "weight scale must be finite and non-negative, got {scale}"
            )));
        }

        let mut layers = Vec::with_capacity(layer_sizes.len() - 1);
        for pair in layer_sizes.windows(2) {
            layers.push(Layer::new_random(pair[0], pair[1], scale, rng));
        }

        Ok(Self {
            layers,
            activation: Activation::default(),
        })
    }

    /// Builds a network from existing layers, checking that they chain.
    pub fn from_layers(layers: Vec<Layer>, activation: Activation) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::Configuration(
                "network needs at least one layer".to_string(),
            ));
        }

        for layer in &layers {
            if layer.input_count() == 0 || layer.output_count() == 0 {
                return Err(Error::Configuration(
                    "layer with zero inputs or outputs".to_string(),
                ));
            }
            if layer.biases.len() != layer.output_count() {
                return Err(Error::DimensionMismatch {
                    expected: layer.output_count(),
                    actual: layer.biases.len(),
                });
            }
        }

        for pair in layers.windows(2) {
            if pair[0].output_count() != pair[1].input_count() {
                return Err(Error::DimensionMismatch {
                    expected: pair[0].output_count(),
                    actual: pair[1].input_count(),
                });
            }
        }

        Ok(Self { layers, activation })
    }

    /// Returns the network with a different activation.
    #[must_use]
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Ordered layers.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Activation used by every layer.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Length of the input vector the network accepts.
    pub fn input_count(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_count)
    }

    /// Length of the output vector the network produces.
    pub fn output_count(&self) -> usize {
        self.layers.last().map_or(0, Layer::output_count)
    }

    /// Layer sizes the network was built with.
    pub fn topology(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.input_count());
        sizes.extend(self.layers.iter().map(Layer::output_count));
        sizes
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Runs a forward pass through all layers.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `inputs` does not match the first
    /// layer's input count.
    pub fn feed_forward(&self, inputs: &Array1<f32>) -> Result<Array1<f32>> {
        if inputs.len() != self.input_count() {
            return Err(Error::DimensionMismatch {
                expected: self.input_count(),
                actual: inputs.len(),
            });
        }

        let mut output = inputs.clone();
        for layer in &self.layers {
            output = layer.forward(&output, self.activation);
        }
        Ok(output)
    }

    /// Mutates every weight and bias in place.
    ///
    /// Each parameter moves by `(r * 2 - 1) * amount` from its current value,
    /// so repeated mutation is a random walk rather than a resample.
    pub fn mutate<R: Rng + ?Sized>(&mut self, amount: f32, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(amount, rng);
        }
    }

    /// Euclidean distance between the parameters of two networks.
    ///
    /// Networks with different topologies are infinitely far apart.
    pub fn distance(first: &Network, second: &Network) -> f32 {
        if first.topology() != second.topology() {
            return f32::INFINITY;
        }

        let mut sum_sq = 0.0_f32;
        for (a, b) in first.layers.iter().zip(&second.layers) {
            for (w1, w2) in a.weights.iter().zip(b.weights.iter()) {
                let diff = w1 - w2;
                sum_sq += diff * diff;
            }
            for (b1, b2) in a.biases.iter().zip(b.biases.iter()) {
                let diff = b1 - b2;
                sum_sq += diff * diff;
            }
        }
        sum_sq.sqrt()
    }

    /// Flattens all weights and biases, layer by layer.
    pub fn to_flat_vector(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
            flat.extend(layer.biases.iter().copied());
        }
        flat
    }

    /// Serializes the network to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a network from JSON, checking that its layers chain.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for malformed data and [`Error::DimensionMismatch`]
    /// when consecutive layers do not chain.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: NetworkData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    /// Saves the network to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), topology = ?self.topology(), "saved network");
        Ok(())
    }

    /// Loads a network from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let network = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), topology = ?network.topology(), "loaded network");
        Ok(network)
    }
}
