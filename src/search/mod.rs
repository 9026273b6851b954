//! # Action Search Module
//!
//! Derivative-free maximizers of a [`Scorer`](crate::scorer::Scorer) over a
//! bounded continuous action space.
//!
//! - [`UniformSampler`]: one round of uniform random candidates per state,
//!   argmax per state. Batched over many states; used for training targets.
//! - [`CrossEntropyOptimizer`]: iterative refinement of a diagonal Gaussian
//!   around the best candidates of a single state; used for live action
//!   selection.
//!
//! Both call the scorer exactly once per candidate batch, with the state
//! embedding broadcast (not copied) across the candidates.
//!
//! ## Ranking order
//!
//! NaN scores rank below every number. Among equal scores the candidate
//! drawn first wins, both for the uniform argmax and for the CEM elite set.

use std::cmp::Ordering;

use ndarray::ArrayView1;

pub mod cem;
pub mod uniform;

pub use cem::{CemReport, CrossEntropyOptimizer, IterationStats, SamplingDistribution};
pub use uniform::UniformSampler;

// Descending by score, NaN last
fn rank(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Index of the highest score; the earliest index wins ties.
///
/// Returns `None` only for an empty slice.
pub fn argmax(scores: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, current)) if rank(score, current) != Ordering::Less => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Indices of the `k` highest scores, best first.
///
/// The sort is stable, so equal scores keep their original order.
/// `k` larger than the slice returns every index.
pub fn top_k(scores: ArrayView1<f32>, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| rank(scores[a], scores[b]));
    order.truncate(k);
    order
}
