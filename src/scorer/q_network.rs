use std::path::Path;

use ndarray::{concatenate, s, Array1, Array2, ArrayView2, Axis};
use ndarray::parallel::prelude::{IntoParallelIterator, ParallelIterator};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{QSearchError, Result};
use crate::layers::{Activation, DenseLayer, WeightInit};
use crate::scorer::Scorer;
use crate::types::Device;

/// Rows forwarded per rayon task on the parallel device
const ROWS_PER_TASK: usize = 256;

/// Q-function over flat state embeddings and raw actions.
///
/// The action is encoded to the embedding width with a ReLU layer, added
/// to the state embedding, and the sum is passed through an MLP head that
/// ends in a single linear output:
///
/// `q(s, a) = head(s + relu(W_a a + b_a))`
///
/// Only inference is provided; parameters are expected to come from an
/// external training process via [`QNetworkScorer::load`] or
/// [`QNetworkScorer::from_layers`].
///
/// # Example
///
/// ```rust
/// use qsearch::scorer::{QNetworkScorer, Scorer};
/// use qsearch::types::Device;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(3);
/// let scorer = QNetworkScorer::builder()
///     .embedding_dim(16)
///     .action_size(2)
///     .hidden_sizes(&[32, 32])
///     .build(&mut rng)
///     .unwrap();
///
/// let states = ndarray::Array2::<f32>::zeros((4, 16));
/// let actions = ndarray::Array2::<f32>::zeros((4, 2));
/// let q = scorer.score(states.view(), actions.view(), Device::Cpu).unwrap();
/// assert_eq!(q.len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QNetworkScorer {
    pub action_encoder: DenseLayer,
    pub head: Vec<DenseLayer>,
}

impl QNetworkScorer {
    pub fn builder() -> QNetworkScorerBuilder {
        QNetworkScorerBuilder::new()
    }

    /// Assemble a scorer from existing layers, checking that they chain
    pub fn from_layers(action_encoder: DenseLayer, head: Vec<DenseLayer>) -> Result<Self> {
        let last = head.last().ok_or_else(|| {
            QSearchError::invalid_parameter("head", "needs at least one layer")
        })?;
        if last.output_size() != 1 {
            return Err(QSearchError::DimensionMismatch {
                expected: "head output of width 1".to_string(),
                actual: format!("width {}", last.output_size()),
            });
        }

        let mut width = action_encoder.output_size();
        for (i, layer) in head.iter().enumerate() {
            if layer.input_size() != width {
                return Err(QSearchError::DimensionMismatch {
                    expected: format!("head layer {} input {}", i, width),
                    actual: format!("{}", layer.input_size()),
                });
            }
            width = layer.output_size();
        }

        let scorer = QNetworkScorer { action_encoder, head };
        if !scorer.is_finite() {
            return Err(QSearchError::NumericalError(
                "network parameters contain NaN or infinite values".to_string(),
            ));
        }
        Ok(scorer)
    }

    pub fn embedding_dim(&self) -> usize {
        self.action_encoder.output_size()
    }

    pub fn action_size(&self) -> usize {
        self.action_encoder.input_size()
    }

    pub fn is_finite(&self) -> bool {
        self.action_encoder.is_finite() && self.head.iter().all(DenseLayer::is_finite)
    }

    fn forward(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Array1<f32> {
        let mut hidden = self.action_encoder.forward_batch(actions) + &states;
        for layer in &self.head {
            hidden = layer.forward_batch(hidden.view());
        }
        hidden.column(0).to_owned()
    }

    fn forward_parallel(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array1<f32>> {
        let rows = actions.nrows();
        let tasks = (rows + ROWS_PER_TASK - 1) / ROWS_PER_TASK;
        let chunks: Vec<Array1<f32>> = (0..tasks)
            .into_par_iter()
            .map(|task| {
                let start = task * ROWS_PER_TASK;
                let end = (start + ROWS_PER_TASK).min(rows);
                self.forward(states.slice(s![start..end, ..]), actions.slice(s![start..end, ..]))
            })
            .collect();

        let views: Vec<_> = chunks.iter().map(|c| c.view()).collect();
        concatenate(Axis(0), &views).map_err(|e| QSearchError::ScorerFailure(e.to_string()))
    }

    /// Save the scorer parameters to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load scorer parameters from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        let scorer: Self = bincode::deserialize(&data)?;
        Self::from_layers(scorer.action_encoder, scorer.head)
    }
}

impl Scorer for QNetworkScorer {
    fn score(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        device: Device,
    ) -> Result<Array1<f32>> {
        if states.ncols() != self.embedding_dim() {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("embedding width {}", self.embedding_dim()),
                actual: format!("{}", states.ncols()),
            });
        }
        if actions.ncols() != self.action_size() {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("action width {}", self.action_size()),
                actual: format!("{}", actions.ncols()),
            });
        }
        if states.nrows() != actions.nrows() {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("{} state rows", actions.nrows()),
                actual: format!("{}", states.nrows()),
            });
        }
        if actions.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }

        match device {
            Device::Cpu => Ok(self.forward(states, actions)),
            Device::Parallel => self.forward_parallel(states, actions),
        }
    }
}

/// Builder for QNetworkScorer
pub struct QNetworkScorerBuilder {
    embedding_dim: usize,
    action_size: usize,
    hidden_sizes: Vec<usize>,
    hidden_activation: Activation,
    init: WeightInit,
}

impl QNetworkScorerBuilder {
    pub fn new() -> Self {
        QNetworkScorerBuilder {
            embedding_dim: 0,
            action_size: 0,
            hidden_sizes: vec![],
            hidden_activation: Activation::Relu,
            init: WeightInit::XavierUniform,
        }
    }

    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    pub fn action_size(mut self, action_size: usize) -> Self {
        self.action_size = action_size;
        self
    }

    pub fn hidden_sizes(mut self, sizes: &[usize]) -> Self {
        self.hidden_sizes = sizes.to_vec();
        self
    }

    /// Activation of the hidden head layers; the output layer stays linear
    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden_activation = activation;
        self
    }

    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.init = init;
        self
    }

    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<QNetworkScorer> {
        if self.embedding_dim == 0 {
            return Err(QSearchError::invalid_parameter("embedding_dim", "must be greater than zero"));
        }
        if self.action_size == 0 {
            return Err(QSearchError::invalid_parameter("action_size", "must be greater than zero"));
        }

        let action_encoder = DenseLayer::new(
            self.action_size,
            self.embedding_dim,
            Activation::Relu,
            self.init,
            rng,
        )?;

        let mut head = Vec::with_capacity(self.hidden_sizes.len() + 1);
        let mut width = self.embedding_dim;
        for &size in &self.hidden_sizes {
            head.push(DenseLayer::new(width, size, self.hidden_activation, self.init, rng)?);
            width = size;
        }
        head.push(DenseLayer::new(width, 1, Activation::Linear, self.init, rng)?);

        QNetworkScorer::from_layers(action_encoder, head)
    }
}

impl Default for QNetworkScorerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
