//! # Agent Module
//!
//! The [`Agent`] ties a state encoder and a Q-value scorer to the two
//! action optimizers and exposes the interface used by environment and
//! training loops.
//!
//! ## Dispatch
//!
//! - [`Agent::select_action`]: one observation at a time. Runs the
//!   cross-entropy method when `use_cem` is set, otherwise a uniform search
//!   over a batch of one.
//! - [`Agent::evaluate`]: a batch of observations. Scores the given actions,
//!   or, when none are given, the best actions found by uniform search.
//!   CEM is never used here since it only handles one state per call.
//!
//! ## Example Usage
//!
//! ```rust
//! use ndarray::{array, Array1, ArrayView2, Axis};
//! use qsearch::agent::Agent;
//! use qsearch::config::SearchConfig;
//! use qsearch::encoder::TimestepEncoder;
//!
//! let config = SearchConfig::builder()
//!     .action_size(1)
//!     .num_uniform(128)
//!     .num_cem(32)
//!     .cem_iter(5)
//!     .cem_elite(4)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! // Prefers actions close to the first observation feature
//! let scorer = |s: ArrayView2<f32>, a: ArrayView2<f32>| -> qsearch::error::Result<Array1<f32>> {
//!     Ok(-(&a.column(0) - &s.column(0)).mapv(|d| d * d))
//! };
//!
//! let mut agent = Agent::new(config, TimestepEncoder, scorer).unwrap();
//! let observation = array![0.4f32, 0.0];
//! let action = agent.select_action(observation.view().into_dyn(), 0.0, true).unwrap();
//! assert_eq!(action.len(), 1);
//! ```

mod search_agent;

pub use search_agent::{Agent, AgentBuilder};
