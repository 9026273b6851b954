use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

/// A single continuous action vector of length `action_size`
pub type ActionVector = Array1<f32>;

/// A batch of state embeddings, one row per state
pub type EmbeddingBatch = Array2<f32>;

/// A batch of action vectors, one row per action
pub type ActionBatch = Array2<f32>;

/// Scalar bounds shared by every action dimension
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionBounds {
    pub low: f32,
    pub high: f32,
}

impl ActionBounds {
    pub fn new(low: f32, high: f32) -> Self {
        ActionBounds { low, high }
    }

    /// Width of the interval
    pub fn width(&self) -> f32 {
        self.high - self.low
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.low && value <= self.high
    }

    /// Clamp a value into `[low, high]`. NaN maps to `low`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.low
        } else {
            value.max(self.low).min(self.high)
        }
    }

    /// True when `low < high` and both the ends and the width are finite
    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low < self.high && self.width().is_finite()
    }
}

impl Default for ActionBounds {
    fn default() -> Self {
        ActionBounds { low: -1.0, high: 1.0 }
    }
}

impl From<(f32, f32)> for ActionBounds {
    fn from((low, high): (f32, f32)) -> Self {
        ActionBounds { low, high }
    }
}

/// Where batched numeric work runs.
///
/// Every device produces identical results for the same seed; random draws
/// always happen on the calling thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Device {
    /// Sequential execution on the calling thread
    #[default]
    Cpu,

    /// Data-parallel execution on the rayon thread pool
    Parallel,
}

impl Device {
    pub fn is_parallel(&self) -> bool {
        matches!(self, Device::Parallel)
    }
}
