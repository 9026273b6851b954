use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::config::CemConfig;
use crate::error::{QSearchError, Result};
use crate::scorer::{score_checked, Scorer};
use crate::search::top_k;
use crate::types::ActionBounds;

/// Diagonal Gaussian over the action space
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingDistribution {
    pub mean: Array1<f32>,
    pub std: Array1<f32>,
}

impl SamplingDistribution {
    /// Standard normal centred on the origin, with the mean clamped into
    /// `bounds` when the origin lies outside them
    pub fn new(action_size: usize, bounds: ActionBounds) -> Self {
        SamplingDistribution {
            mean: Array1::from_elem(action_size, bounds.clamp(0.0)),
            std: Array1::ones(action_size),
        }
    }

    pub fn action_size(&self) -> usize {
        self.mean.len()
    }

    /// Draw `n` candidates, clamping every component into `bounds`
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, bounds: ActionBounds, rng: &mut R) -> Array2<f32> {
        let noise: Array2<f32> = Array2::random_using((n, self.action_size()), StandardNormal, rng);
        let mut samples = noise * &self.std + &self.mean;
        samples.mapv_inplace(|x| bounds.clamp(x));
        samples
    }

    /// Re-estimate mean and std from an elite set.
    ///
    /// The mean is clamped into `bounds` so rounding never pushes it past an
    /// edge. The std uses the `n - 1` denominator. Any component that comes out
    /// non-finite or below `min_std` (always the case for a single elite) is
    /// set to `min_std`. An empty elite set leaves the distribution as is.
    /// Returns true when the floor engaged.
    pub fn refit(&mut self, elites: ArrayView2<f32>, bounds: ActionBounds, min_std: f32) -> bool {
        let mean = match elites.mean_axis(Axis(0)) {
            Some(mean) => mean.mapv(|x| bounds.clamp(x)),
            None => return true,
        };

        let raw_std = if elites.nrows() > 1 {
            elites.std_axis(Axis(0), 1.0)
        } else {
            Array1::zeros(elites.ncols())
        };

        let mut floored = false;
        self.std = raw_std.mapv(|s| {
            if s.is_finite() && s >= min_std {
                s
            } else {
                floored = true;
                min_std
            }
        });
        self.mean = mean;
        floored
    }
}

/// Summary of one CEM round
#[derive(Clone, Debug, PartialEq)]
pub struct IterationStats {
    pub best_score: f32,
    pub mean_score: f32,
    /// Mean of the refitted per-dimension std
    pub mean_std: f32,
}

/// Result of a CEM run with per-iteration diagnostics
#[derive(Clone, Debug)]
pub struct CemReport {
    pub action: Array1<f32>,
    pub iterations: Vec<IterationStats>,
    /// Rounds in which the std floor engaged
    pub floored_iterations: usize,
}

/// Cross-entropy method over the action space of a single state.
///
/// Starting from `N(0, I)`, each of the `cem_iter` rounds draws `num_cem`
/// clamped candidates, scores them in one scorer call against the
/// broadcast state embedding, and refits the Gaussian to the `cem_elite`
/// best. The final mean is the selected action.
///
/// # Example
///
/// ```rust
/// use ndarray::{array, Array1, ArrayView2, Axis};
/// use qsearch::config::SearchConfig;
/// use qsearch::search::CrossEntropyOptimizer;
/// use rand::SeedableRng;
///
/// let config = SearchConfig::builder()
///     .action_size(2)
///     .num_cem(50)
///     .cem_iter(15)
///     .cem_elite(5)
///     .build()
///     .unwrap();
/// let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
///
/// let target = array![0.3f32, -0.3];
/// let scorer = move |_s: ArrayView2<f32>, a: ArrayView2<f32>| -> qsearch::error::Result<Array1<f32>> {
///     Ok((&a - &target).mapv(|d| -d * d).sum_axis(Axis(1)))
/// };
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let state = Array1::<f32>::zeros(8);
/// let action = cem.optimize(&scorer, state.view(), &mut rng).unwrap();
/// assert_eq!(action.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct CrossEntropyOptimizer {
    config: CemConfig,
}

impl CrossEntropyOptimizer {
    pub fn new(config: CemConfig) -> Result<Self> {
        config.validate()?;
        Ok(CrossEntropyOptimizer { config })
    }

    pub fn config(&self) -> &CemConfig {
        &self.config
    }

    /// Selected action for one state embedding
    pub fn optimize<S, R>(&self, scorer: &S, state: ArrayView1<f32>, rng: &mut R) -> Result<Array1<f32>>
    where
        S: Scorer + ?Sized,
        R: Rng + ?Sized,
    {
        Ok(self.optimize_with_report(scorer, state, rng)?.action)
    }

    pub fn optimize_with_report<S, R>(
        &self,
        scorer: &S,
        state: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<CemReport>
    where
        S: Scorer + ?Sized,
        R: Rng + ?Sized,
    {
        let CemConfig {
            action_size,
            num_cem,
            cem_iter,
            cem_elite,
            bounds,
            min_std,
            device,
        } = self.config;

        let hidden = state.broadcast((num_cem, state.len())).ok_or_else(|| {
            QSearchError::dimension_mismatch(
                format!("embedding broadcastable to ({}, {})", num_cem, state.len()),
                format!("{:?}", state.dim()),
            )
        })?;

        let mut distribution = SamplingDistribution::new(action_size, bounds);
        let mut iterations = Vec::with_capacity(cem_iter);
        let mut floored_iterations = 0;

        for iteration in 0..cem_iter {
            let candidates = distribution.sample(num_cem, bounds, rng);
            let scores = score_checked(scorer, hidden, candidates.view(), device)?;

            let elite = top_k(scores.view(), cem_elite);
            let elites = candidates.select(Axis(0), &elite);
            if distribution.refit(elites.view(), bounds, min_std) {
                floored_iterations += 1;
                tracing::debug!(iteration, min_std, "CEM std floor engaged");
            }

            let stats = IterationStats {
                best_score: scores[elite[0]],
                mean_score: scores.mean().unwrap_or(f32::NAN),
                mean_std: distribution.std.mean().unwrap_or(0.0),
            };
            tracing::trace!(
                iteration,
                best_score = stats.best_score,
                mean_score = stats.mean_score,
                mean_std = stats.mean_std,
                "CEM iteration"
            );
            iterations.push(stats);
        }

        Ok(CemReport {
            action: distribution.mean,
            iterations,
            floored_iterations,
        })
    }
}
