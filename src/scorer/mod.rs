//! # Scoring Module
//!
//! A [`Scorer`] maps index-aligned batches of state embeddings and actions
//! to one Q-value per pair. The action optimizers treat it as an opaque,
//! possibly expensive, pure function and call it once per candidate batch.
//!
//! Any `Fn(ArrayView2<f32>, ArrayView2<f32>) -> Result<Array1<f32>>` closure
//! that is `Send + Sync` is a scorer, which keeps synthetic objectives short:
//!
//! ```rust
//! use ndarray::{Array1, ArrayView2, Axis};
//! use qsearch::scorer::Scorer;
//! use qsearch::types::Device;
//!
//! // Negative squared distance to the origin
//! let scorer = |_states: ArrayView2<f32>, actions: ArrayView2<f32>| -> qsearch::error::Result<Array1<f32>> {
//!     Ok(actions.mapv(|a| -a * a).sum_axis(Axis(1)))
//! };
//! let states = ndarray::Array2::<f32>::zeros((2, 4));
//! let actions = ndarray::array![[0.0, 0.0], [1.0, 1.0]];
//! let scores = scorer.score(states.view(), actions.view(), Device::Cpu).unwrap();
//! assert!(scores[0] > scores[1]);
//! ```

use ndarray::{Array1, ArrayView2};

use crate::error::{QSearchError, Result};
use crate::types::Device;

pub mod q_network;

pub use q_network::{QNetworkScorer, QNetworkScorerBuilder};

/// Batched Q-value function over (state embedding, action) pairs
pub trait Scorer: Send + Sync {
    /// Score `actions[i]` in `states[i]` for every row `i`.
    ///
    /// Both batches have the same number of rows. `states` may be a
    /// zero-copy broadcast of a single embedding.
    fn score(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        device: Device,
    ) -> Result<Array1<f32>>;
}

impl<F> Scorer for F
where
    F: Fn(ArrayView2<f32>, ArrayView2<f32>) -> Result<Array1<f32>> + Send + Sync,
{
    fn score(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        _device: Device,
    ) -> Result<Array1<f32>> {
        self(states, actions)
    }
}

/// Score a batch and enforce the input/output length contract
pub fn score_checked<S: Scorer + ?Sized>(
    scorer: &S,
    states: ArrayView2<f32>,
    actions: ArrayView2<f32>,
    device: Device,
) -> Result<Array1<f32>> {
    if states.nrows() != actions.nrows() {
        return Err(QSearchError::DimensionMismatch {
            expected: format!("{} state rows", actions.nrows()),
            actual: format!("{} state rows", states.nrows()),
        });
    }
    let scores = scorer.score(states, actions, device)?;
    check_scores(actions.nrows(), &scores)?;
    Ok(scores)
}

/// Verify that a scorer returned one score per candidate
pub fn check_scores(expected: usize, scores: &Array1<f32>) -> Result<()> {
    if scores.len() != expected {
        return Err(QSearchError::DimensionMismatch {
            expected: format!("{} scores", expected),
            actual: format!("{} scores", scores.len()),
        });
    }
    Ok(())
}
