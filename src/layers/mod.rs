//! # Layers Module
//!
//! Inference-only dense layers backing [`QNetworkScorer`](crate::scorer::QNetworkScorer).
//! Parameters are drawn from an injected random source so that networks
//! built from the same seed are identical.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{QSearchError, Result};

/// Activation applied after a layer's affine map
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Tanh,
    Linear,
}

impl Activation {
    /// Apply the activation in place
    pub fn apply_batch(&self, outputs: &mut Array2<f32>) {
        match self {
            Activation::Relu => outputs.mapv_inplace(|x| x.max(0.0)),
            Activation::Tanh => outputs.mapv_inplace(|x| x.tanh()),
            Activation::Linear => {}
        }
    }
}

/// Weight initialization strategies
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming normal initialization (for ReLU)
    HeNormal,

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a `(fan_in, fan_out)` weight matrix
    pub fn initialize_weights<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Result<Array2<f32>> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Ok(Array2::random_using(shape, Uniform::new(-limit, limit), rng))
            }

            WeightInit::HeNormal => {
                let std = (2.0 / fan_in as f32).sqrt();
                let normal = Normal::new(0.0, std)
                    .map_err(|e| QSearchError::NumericalError(e.to_string()))?;
                Ok(Array2::random_using(shape, normal, rng))
            }

            WeightInit::Zeros => Ok(Array2::zeros(shape)),
        }
    }
}

/// A fully connected layer.
///
/// Weights are stored as `(input_size, output_size)` so a batch is
/// transformed with `inputs.dot(&weights)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    /// Create a layer with initialized weights and zero biases
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 || output_size == 0 {
            return Err(QSearchError::InvalidParameter {
                name: "layer_size".to_string(),
                reason: format!("layer {}x{} has an empty side", input_size, output_size),
            });
        }
        let weights = init.initialize_weights((input_size, output_size), rng)?;
        Ok(DenseLayer {
            weights,
            biases: Array1::zeros(output_size),
            activation,
        })
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("{:?}", self.weights.dim()),
                actual: format!("{:?}", weights.dim()),
            });
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("{}", self.biases.len()),
                actual: format!("{}", biases.len()),
            });
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// True when every parameter is finite
    pub fn is_finite(&self) -> bool {
        self.weights.iter().chain(self.biases.iter()).all(|w| w.is_finite())
    }
}
