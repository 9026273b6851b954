//! # State Encoding
//!
//! A [`StateEncoder`] turns a batch of raw observations and their timesteps
//! into flat state embeddings, one row per observation. Image feature
//! extractors live outside this crate and plug in through this trait.

use ndarray::{Array2, ArrayView1, ArrayViewD, Axis};

use crate::error::{QSearchError, Result};

/// Maps observations plus timesteps to state embeddings
pub trait StateEncoder: Send + Sync {
    /// Embed a batch of observations.
    ///
    /// `observations` carries the batch on axis 0 and `timesteps` holds one
    /// value per observation.
    fn embed(&self, observations: ArrayViewD<f32>, timesteps: ArrayView1<f32>) -> Result<Array2<f32>>;
}

/// Flattens each observation and appends its timestep as one more plane.
///
/// For a channel-first batch of shape `(B, C, H, W)` the result is the
/// flattening of `(B, C + 1, H, W)` where the extra channel is filled with
/// the timestep. Flat `(B, F)` observations get a single extra column.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestepEncoder;

impl TimestepEncoder {
    pub fn new() -> Self {
        TimestepEncoder
    }

    /// Width of the embedding produced for one observation of `shape`
    pub fn embedding_dim(shape: &[usize]) -> usize {
        let features: usize = shape.iter().product();
        features + Self::plane_size(shape)
    }

    // Number of cells the timestep is broadcast over: the trailing spatial
    // dims for channel-first inputs, otherwise one.
    fn plane_size(shape: &[usize]) -> usize {
        if shape.len() >= 2 {
            shape[1..].iter().product()
        } else {
            1
        }
    }
}

impl StateEncoder for TimestepEncoder {
    fn embed(&self, observations: ArrayViewD<f32>, timesteps: ArrayView1<f32>) -> Result<Array2<f32>> {
        if observations.ndim() < 2 {
            return Err(QSearchError::DimensionMismatch {
                expected: "batched observations with at least 2 axes".to_string(),
                actual: format!("{} axes", observations.ndim()),
            });
        }
        let batch = observations.len_of(Axis(0));
        if timesteps.len() != batch {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("{} timesteps", batch),
                actual: format!("{}", timesteps.len()),
            });
        }

        let sample_shape = &observations.shape()[1..];
        let features: usize = sample_shape.iter().product();
        let plane = Self::plane_size(sample_shape);

        let mut embeddings = Array2::zeros((batch, features + plane));
        for (i, (sample, &t)) in observations.outer_iter().zip(timesteps.iter()).enumerate() {
            let mut row = embeddings.row_mut(i);
            for (dst, &src) in row.iter_mut().zip(sample.iter()) {
                *dst = src;
            }
            row.slice_mut(ndarray::s![features..]).fill(t);
        }
        Ok(embeddings)
    }
}
