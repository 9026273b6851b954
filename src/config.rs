//! Search configuration.
//!
//! [`SearchConfig`] holds every knob of both action optimizers. It is
//! validated once, at construction time, so that no optimizer ever fails
//! mid-iteration on a bad parameter.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{QSearchError, Result};
use crate::types::{ActionBounds, Device};

/// Default floor applied to the CEM standard deviation
pub const DEFAULT_MIN_STD: f32 = 1e-3;

/// Configuration shared by the uniform sampler, the cross-entropy optimizer
/// and the agent that dispatches between them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Dimension of every action vector
    pub action_size: usize,
    /// Candidates drawn per state by the uniform sampler
    pub num_uniform: usize,
    /// Candidates drawn per CEM iteration
    pub num_cem: usize,
    /// Number of CEM refinement rounds
    pub cem_iter: usize,
    /// Size of the CEM elite set
    pub cem_elite: usize,
    /// Scalar bounds applied to every action component
    pub bounds: ActionBounds,
    /// Smallest standard deviation the CEM distribution may collapse to
    #[serde(default = "default_min_std")]
    pub min_std: f32,
    #[serde(default)]
    pub device: Device,
    /// Seed for the agent's random source; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_min_std() -> f32 {
    DEFAULT_MIN_STD
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            action_size: 0,
            num_uniform: 64,
            num_cem: 64,
            cem_iter: 3,
            cem_elite: 6,
            bounds: ActionBounds::default(),
            min_std: DEFAULT_MIN_STD,
            device: Device::Cpu,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Create a config with default search sizes for the given action dimension
    pub fn new(action_size: usize) -> Self {
        SearchConfig {
            action_size,
            ..Default::default()
        }
    }

    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Check every parameter and parameter combination
    pub fn validate(&self) -> Result<()> {
        self.uniform_config().validate()?;
        self.cem_config().validate()
    }

    pub fn uniform_config(&self) -> UniformConfig {
        UniformConfig {
            action_size: self.action_size,
            num_uniform: self.num_uniform,
            bounds: self.bounds,
            device: self.device,
        }
    }

    pub fn cem_config(&self) -> CemConfig {
        CemConfig {
            action_size: self.action_size,
            num_cem: self.num_cem,
            cem_iter: self.cem_iter,
            cem_elite: self.cem_elite,
            bounds: self.bounds,
            min_std: self.min_std,
            device: self.device,
        }
    }

    /// Write the config as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Read and validate a config from JSON
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}

/// Parameters of the uniform random search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformConfig {
    pub action_size: usize,
    pub num_uniform: usize,
    pub bounds: ActionBounds,
    pub device: Device,
}

impl UniformConfig {
    pub fn validate(&self) -> Result<()> {
        check_action_space(self.action_size, &self.bounds)?;
        if self.num_uniform == 0 {
            return Err(QSearchError::invalid_parameter(
                "num_uniform",
                "must draw at least one candidate",
            ));
        }
        Ok(())
    }
}

/// Parameters of the cross-entropy method
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CemConfig {
    pub action_size: usize,
    pub num_cem: usize,
    pub cem_iter: usize,
    pub cem_elite: usize,
    pub bounds: ActionBounds,
    pub min_std: f32,
    pub device: Device,
}

impl CemConfig {
    pub fn validate(&self) -> Result<()> {
        check_action_space(self.action_size, &self.bounds)?;
        if self.num_cem == 0 {
            return Err(QSearchError::invalid_parameter(
                "num_cem",
                "must draw at least one candidate per iteration",
            ));
        }
        if self.cem_elite == 0 {
            return Err(QSearchError::invalid_parameter(
                "cem_elite",
                "elite set must hold at least one candidate",
            ));
        }
        if self.cem_elite > self.num_cem {
            return Err(QSearchError::InvalidParameter {
                name: "cem_elite".to_string(),
                reason: format!(
                    "elite size {} exceeds candidate count {}",
                    self.cem_elite, self.num_cem
                ),
            });
        }
        if !(self.min_std.is_finite() && self.min_std > 0.0) {
            return Err(QSearchError::InvalidParameter {
                name: "min_std".to_string(),
                reason: format!("must be finite and positive, got {}", self.min_std),
            });
        }
        Ok(())
    }
}

fn check_action_space(action_size: usize, bounds: &ActionBounds) -> Result<()> {
    if action_size == 0 {
        return Err(QSearchError::invalid_parameter(
            "action_size",
            "must be greater than zero",
        ));
    }
    if !bounds.is_valid() {
        return Err(QSearchError::InvalidParameter {
            name: "bounds".to_string(),
            reason: format!(
                "require finite low < high with a finite width, got ({}, {})",
                bounds.low, bounds.high
            ),
        });
    }
    Ok(())
}

/// Builder pattern for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        SearchConfigBuilder {
            config: SearchConfig::default(),
        }
    }

    pub fn action_size(mut self, action_size: usize) -> Self {
        self.config.action_size = action_size;
        self
    }

    pub fn num_uniform(mut self, num_uniform: usize) -> Self {
        self.config.num_uniform = num_uniform;
        self
    }

    pub fn num_cem(mut self, num_cem: usize) -> Self {
        self.config.num_cem = num_cem;
        self
    }

    pub fn cem_iter(mut self, cem_iter: usize) -> Self {
        self.config.cem_iter = cem_iter;
        self
    }

    pub fn cem_elite(mut self, cem_elite: usize) -> Self {
        self.config.cem_elite = cem_elite;
        self
    }

    pub fn bounds(mut self, low: f32, high: f32) -> Self {
        self.config.bounds = ActionBounds::new(low, high);
        self
    }

    pub fn min_std(mut self, min_std: f32) -> Self {
        self.config.min_std = min_std;
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
