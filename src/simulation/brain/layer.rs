//! A single fully connected layer.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Activation;

/// One fully connected layer of a feedforward network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Weight matrix (`output_count` × `input_count`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_count`).
    pub biases: Array1<f32>,
}

impl Layer {
    /// Creates a layer with weights and biases uniform in `[-scale, scale]`.
    pub fn new_random<R: Rng + ?Sized>(
        input_count: usize,
        output_count: usize,
        scale: f32,
        rng: &mut R,
    ) -> Self {
        let weights = Array2::from_shape_fn((output_count, input_count), |_| {
            rng.random_range(-scale..=scale)
        });
        let biases = Array1::from_shape_fn(output_count, |_| rng.random_range(-scale..=scale));
        Self { weights, biases }
    }

    /// Number of inputs the layer consumes.
    pub fn input_count(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs the layer produces.
    pub fn output_count(&self) -> usize {
        self.weights.nrows()
    }

    /// Performs a forward pass. The caller checks the input length.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>, activation: Activation) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output.mapv_inplace(|x| activation.apply(x));
        output
    }

    /// Nudges every weight and bias by `(r * 2 - 1) * amount`, `r` uniform in `[0, 1)`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, amount: f32, rng: &mut R) {
        self.weights
            .mapv_inplace(|w| w + (rng.random::<f32>() * 2.0 - 1.0) * amount);
        self.biases
            .mapv_inplace(|b| b + (rng.random::<f32>() * 2.0 - 1.0) * amount);
    }
}
