use ndarray::{arr1, Array1, Array2, ArrayView1, ArrayView2, ArrayViewD, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SearchConfig;
use crate::encoder::StateEncoder;
use crate::error::{QSearchError, Result};
use crate::scorer::{score_checked, Scorer};
use crate::search::{CemReport, CrossEntropyOptimizer, UniformSampler};

/// Continuous-action Q-learning agent with derivative-free action search.
///
/// The agent holds no state between calls besides its random source and
/// whatever parameters the scorer carries.
pub struct Agent<E, S> {
    config: SearchConfig,
    encoder: E,
    scorer: S,
    uniform: UniformSampler,
    cem: CrossEntropyOptimizer,
    rng: StdRng,
}

impl<E: StateEncoder, S: Scorer> Agent<E, S> {
    /// Create an agent, validating the whole configuration up front
    pub fn new(config: SearchConfig, encoder: E, scorer: S) -> Result<Self> {
        config.validate()?;
        let uniform = UniformSampler::new(config.uniform_config())?;
        let cem = CrossEntropyOptimizer::new(config.cem_config())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::debug!(
            action_size = config.action_size,
            num_uniform = config.num_uniform,
            num_cem = config.num_cem,
            cem_iter = config.cem_iter,
            cem_elite = config.cem_elite,
            device = ?config.device,
            "created search agent"
        );

        Ok(Agent {
            config,
            encoder,
            scorer,
            uniform,
            cem,
            rng,
        })
    }

    pub fn builder() -> AgentBuilder<E, S> {
        AgentBuilder::new()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Mutable access for swapping in freshly trained parameters between calls
    pub fn scorer_mut(&mut self) -> &mut S {
        &mut self.scorer
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Restart the random source from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Embed a batch of observations (batch on axis 0)
    pub fn embed(&self, observations: ArrayViewD<f32>, timesteps: ArrayView1<f32>) -> Result<Array2<f32>> {
        let embeddings = self.encoder.embed(observations, timesteps)?;
        if embeddings.nrows() != timesteps.len() {
            return Err(QSearchError::DimensionMismatch {
                expected: format!("{} embeddings", timesteps.len()),
                actual: format!("{}", embeddings.nrows()),
            });
        }
        Ok(embeddings)
    }

    /// Pick an action for a single, unbatched observation
    pub fn select_action(
        &mut self,
        observation: ArrayViewD<f32>,
        timestep: f32,
        use_cem: bool,
    ) -> Result<Array1<f32>> {
        let embeddings = self.embed(observation.insert_axis(Axis(0)), arr1(&[timestep]).view())?;
        let state = embeddings.row(0);

        if use_cem {
            self.cem.optimize(&self.scorer, state, &mut self.rng)
        } else {
            let best = self
                .uniform
                .optimize(&self.scorer, state.insert_axis(Axis(0)), &mut self.rng)?;
            Ok(best.row(0).to_owned())
        }
    }

    /// CEM action selection with per-iteration diagnostics
    pub fn select_action_with_report(
        &mut self,
        observation: ArrayViewD<f32>,
        timestep: f32,
    ) -> Result<CemReport> {
        let embeddings = self.embed(observation.insert_axis(Axis(0)), arr1(&[timestep]).view())?;
        self.cem.optimize_with_report(&self.scorer, embeddings.row(0), &mut self.rng)
    }

    /// Q-values for a batch of observations.
    ///
    /// With `actions` given, scores those actions. Without, scores the best
    /// actions found by uniform search.
    pub fn evaluate(
        &mut self,
        observations: ArrayViewD<f32>,
        timesteps: ArrayView1<f32>,
        actions: Option<ArrayView2<f32>>,
    ) -> Result<Array1<f32>> {
        let embeddings = self.embed(observations, timesteps)?;
        self.evaluate_embeddings(embeddings.view(), actions)
    }

    /// [`Agent::evaluate`] for states that are already embedded
    pub fn evaluate_embeddings(
        &mut self,
        embeddings: ArrayView2<f32>,
        actions: Option<ArrayView2<f32>>,
    ) -> Result<Array1<f32>> {
        match actions {
            Some(actions) => {
                if actions.dim() != (embeddings.nrows(), self.config.action_size) {
                    return Err(QSearchError::DimensionMismatch {
                        expected: format!("({}, {}) actions", embeddings.nrows(), self.config.action_size),
                        actual: format!("{:?}", actions.dim()),
                    });
                }
                score_checked(&self.scorer, embeddings, actions, self.config.device)
            }
            None => {
                let best = self.best_actions(embeddings)?;
                score_checked(&self.scorer, embeddings, best.view(), self.config.device)
            }
        }
    }

    /// Uniform-search best action for every embedded state
    pub fn best_actions(&mut self, embeddings: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.uniform.optimize(&self.scorer, embeddings, &mut self.rng)
    }
}

/// Builder pattern for Agent
pub struct AgentBuilder<E, S> {
    config: Option<SearchConfig>,
    encoder: Option<E>,
    scorer: Option<S>,
    seed: Option<u64>,
}

impl<E: StateEncoder, S: Scorer> AgentBuilder<E, S> {
    pub fn new() -> Self {
        AgentBuilder {
            config: None,
            encoder: None,
            scorer: None,
            seed: None,
        }
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn encoder(mut self, encoder: E) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn scorer(mut self, scorer: S) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Overrides any seed carried by the config
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Agent<E, S>> {
        let mut config = self.config.ok_or_else(|| {
            QSearchError::invalid_parameter("config", "search config must be specified")
        })?;
        let encoder = self.encoder.ok_or_else(|| {
            QSearchError::invalid_parameter("encoder", "state encoder must be specified")
        })?;
        let scorer = self.scorer.ok_or_else(|| {
            QSearchError::invalid_parameter("scorer", "scorer must be specified")
        })?;
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Agent::new(config, encoder, scorer)
    }
}

impl<E: StateEncoder, S: Scorer> Default for AgentBuilder<E, S> {
    fn default() -> Self {
        Self::new()
    }
}
