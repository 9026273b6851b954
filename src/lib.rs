//! # qsearch - Action Search for Continuous-Action Q-Learning
//!
//! qsearch implements the action-selection core of a Q-learning agent whose
//! actions are continuous vectors. A Q-function cannot be maximized by
//! enumerating actions in that setting, so the agent optimizes over the
//! action space with derivative-free search instead.
//!
//! ## Key Features
//!
//! - **Uniform Search**: One batched round of uniform random candidates per
//!   state, used for training targets over many states at once
//! - **Cross-Entropy Method**: Iterative Gaussian refinement for a single
//!   state, used for live action selection
//! - **Pluggable Scoring**: Any batched `score(states, actions)` function,
//!   including plain closures, plus a dense reference Q-network
//! - **Reproducible**: Every random draw comes from an explicit, seedable
//!   generator; results do not depend on the compute [`Device`](types::Device)
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::{array, Array1, ArrayView2, Axis};
//! use qsearch::config::SearchConfig;
//! use qsearch::search::UniformSampler;
//! use rand::SeedableRng;
//!
//! let config = SearchConfig::builder()
//!     .action_size(2)
//!     .num_uniform(1000)
//!     .build()
//!     .unwrap();
//! let sampler = UniformSampler::new(config.uniform_config()).unwrap();
//!
//! // Negative squared distance to (0.3, -0.3)
//! let target = array![0.3f32, -0.3];
//! let scorer = move |_s: ArrayView2<f32>, a: ArrayView2<f32>| -> qsearch::error::Result<Array1<f32>> {
//!     Ok((&a - &target).mapv(|d| -d * d).sum_axis(Axis(1)))
//! };
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let states = ndarray::Array2::<f32>::zeros((4, 16));
//! let actions = sampler.optimize(&scorer, states.view(), &mut rng).unwrap();
//! assert_eq!(actions.dim(), (4, 2));
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - Agent dispatching between the two optimizers
//! - [`config`] - Search configuration, validation and JSON persistence
//! - [`encoder`] - State encoder interface and a timestep-concatenating encoder
//! - [`error`] - Error types and result handling
//! - [`layers`] - Inference-only dense layers
//! - [`scorer`] - Scorer interface and the reference Q-network scorer
//! - [`search`] - Uniform search, cross-entropy method and ranking helpers
//! - [`types`] - Action bounds, devices and array aliases

pub mod agent;
pub mod config;
pub mod encoder;
pub mod error;
pub mod layers;
pub mod scorer;
pub mod search;
pub mod types;

#[cfg(test)]
mod tests;
