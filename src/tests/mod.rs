pub mod test_search;

use ndarray::{Array1, ArrayView2, Axis};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;
use crate::scorer::Scorer;
use crate::types::Device;

/// Negative squared distance to a fixed target action; counts its calls
pub struct TargetScorer {
    pub target: Array1<f32>,
    pub calls: AtomicUsize,
}

impl TargetScorer {
    pub fn new(target: Array1<f32>) -> Self {
        TargetScorer {
            target,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for TargetScorer {
    fn score(&self, _states: ArrayView2<f32>, actions: ArrayView2<f32>, _device: Device) -> Result<Array1<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((&actions - &self.target).mapv(|d| -d * d).sum_axis(Axis(1)))
    }
}
