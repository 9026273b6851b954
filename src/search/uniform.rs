use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use ndarray::parallel::prelude::{IntoParallelIterator, ParallelIterator};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::config::UniformConfig;
use crate::error::{QSearchError, Result};
use crate::scorer::{score_checked, Scorer};
use crate::search::argmax;
use crate::types::Device;

/// Single-shot uniform random search, batched over states.
///
/// For every state, `num_uniform` candidates are drawn uniformly from
/// `[low, high]^action_size`, scored in one scorer call against the
/// broadcast state embedding, and the best candidate is kept.
///
/// All candidates are drawn up front on the calling thread, so the result
/// for a given seed does not depend on the configured [`Device`].
#[derive(Clone, Debug)]
pub struct UniformSampler {
    config: UniformConfig,
}

impl UniformSampler {
    pub fn new(config: UniformConfig) -> Result<Self> {
        config.validate()?;
        Ok(UniformSampler { config })
    }

    pub fn config(&self) -> &UniformConfig {
        &self.config
    }

    /// Draw the `(batch, num_uniform, action_size)` candidate tensor
    pub fn sample_candidates<R: Rng + ?Sized>(&self, batch: usize, rng: &mut R) -> Array3<f32> {
        let bounds = self.config.bounds;
        Array3::random_using(
            (batch, self.config.num_uniform, self.config.action_size),
            Uniform::new_inclusive(bounds.low, bounds.high),
            rng,
        )
    }

    /// Best sampled action for every row of `states`
    pub fn optimize<S, R>(&self, scorer: &S, states: ArrayView2<f32>, rng: &mut R) -> Result<Array2<f32>>
    where
        S: Scorer + ?Sized,
        R: Rng + ?Sized,
    {
        let candidates = self.sample_candidates(states.nrows(), rng);
        self.select_best(scorer, states, candidates.view())
    }

    /// Pick, for each state `i`, the best row of `candidates[i]`
    pub fn select_best<S>(
        &self,
        scorer: &S,
        states: ArrayView2<f32>,
        candidates: ArrayView3<f32>,
    ) -> Result<Array2<f32>>
    where
        S: Scorer + ?Sized,
    {
        let (batch, num_candidates, action_size) = candidates.dim();
        if batch != states.nrows() || action_size != self.config.action_size || num_candidates == 0 {
            return Err(QSearchError::DimensionMismatch {
                expected: format!(
                    "({}, >0, {}) candidates",
                    states.nrows(),
                    self.config.action_size
                ),
                actual: format!("{:?}", candidates.dim()),
            });
        }

        tracing::trace!(
            batch,
            candidates = num_candidates,
            device = ?self.config.device,
            "uniform action search"
        );

        let device = self.config.device;
        let best: Vec<Array1<f32>> = match device {
            Device::Cpu => (0..batch)
                .map(|i| best_for_state(scorer, states.row(i), candidates.index_axis(Axis(0), i), device))
                .collect::<Result<_>>()?,
            Device::Parallel => (0..batch)
                .into_par_iter()
                .map(|i| best_for_state(scorer, states.row(i), candidates.index_axis(Axis(0), i), device))
                .collect::<Result<_>>()?,
        };

        let mut actions = Array2::zeros((batch, action_size));
        for (mut row, action) in actions.outer_iter_mut().zip(best.iter()) {
            row.assign(action);
        }
        Ok(actions)
    }
}

fn best_for_state<S: Scorer + ?Sized>(
    scorer: &S,
    state: ArrayView1<f32>,
    candidates: ArrayView2<f32>,
    device: Device,
) -> Result<Array1<f32>> {
    let n = candidates.nrows();
    let hidden = state.broadcast((n, state.len())).ok_or_else(|| {
        QSearchError::dimension_mismatch(
            format!("embedding broadcastable to ({}, {})", n, state.len()),
            format!("{:?}", state.dim()),
        )
    })?;
    let scores = score_checked(scorer, hidden, candidates, device)?;
    let best = argmax(scores.view())
        .ok_or_else(|| QSearchError::NumericalError("no candidate scores to rank".to_string()))?;
    Ok(candidates.row(best).to_owned())
}
