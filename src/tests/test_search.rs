use ndarray::{array, Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::TargetScorer;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::{CrossEntropyOptimizer, SamplingDistribution, UniformSampler};
use crate::types::{ActionBounds, Device};

fn distance(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    (a - b).iter().map(|d| d.abs()).fold(0.0, f32::max)
}

#[test]
fn test_uniform_returns_one_action_per_state() {
    let config = SearchConfig { num_uniform: 32, ..SearchConfig::new(3) };
    let sampler = UniformSampler::new(config.uniform_config()).unwrap();
    let scorer = TargetScorer::new(array![0.0, 0.0, 0.0]);
    let mut rng = StdRng::seed_from_u64(0);

    let states = Array2::<f32>::zeros((7, 4));
    let actions = sampler.optimize(&scorer, states.view(), &mut rng).unwrap();
    assert_eq!(actions.dim(), (7, 3));
    assert!(actions.iter().all(|&x| (-1.0..=1.0).contains(&x)));
    // one batched call per state, never one per candidate
    assert_eq!(scorer.calls(), 7);
}

#[test]
fn test_uniform_constant_scorer_keeps_first_candidate() {
    let scorer = |_s: ArrayView2<f32>, a: ArrayView2<f32>| -> Result<Array1<f32>> {
        Ok(Array1::from_elem(a.nrows(), 0.25))
    };
    let config = SearchConfig { num_uniform: 20, ..SearchConfig::new(2) };
    let sampler = UniformSampler::new(config.uniform_config()).unwrap();
    let states = Array2::<f32>::zeros((3, 5));

    let best = sampler
        .optimize(&scorer, states.view(), &mut StdRng::seed_from_u64(17))
        .unwrap();
    let again = sampler
        .optimize(&scorer, states.view(), &mut StdRng::seed_from_u64(17))
        .unwrap();
    assert_eq!(best, again);

    let candidates = sampler.sample_candidates(3, &mut StdRng::seed_from_u64(17));
    for i in 0..3 {
        assert_eq!(best.row(i), candidates.index_axis(Axis(0), i).row(0));
    }
}

#[test]
fn test_uniform_parallel_matches_cpu() {
    let scorer = TargetScorer::new(array![0.2, -0.7]);
    let states = Array2::<f32>::from_shape_fn((16, 3), |(i, j)| (i * 3 + j) as f32);

    let cpu = SearchConfig { num_uniform: 64, ..SearchConfig::new(2) };
    let par = SearchConfig { device: Device::Parallel, ..cpu.clone() };
    let cpu = UniformSampler::new(cpu.uniform_config()).unwrap();
    let par = UniformSampler::new(par.uniform_config()).unwrap();

    let a = cpu.optimize(&scorer, states.view(), &mut StdRng::seed_from_u64(3)).unwrap();
    let b = par.optimize(&scorer, states.view(), &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_uniform_states_are_independent() {
    // each state picks the candidate matching its own sign
    let scorer = |s: ArrayView2<f32>, a: ArrayView2<f32>| -> Result<Array1<f32>> {
        Ok(&s.column(0) * &a.column(0))
    };
    let config = SearchConfig { num_uniform: 200, ..SearchConfig::new(1) };
    let sampler = UniformSampler::new(config.uniform_config()).unwrap();
    let states = array![[1.0], [-1.0], [1.0], [-1.0]];
    let best = sampler
        .optimize(&scorer, states.view(), &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert!(best[[0, 0]] > 0.9 && best[[2, 0]] > 0.9);
    assert!(best[[1, 0]] < -0.9 && best[[3, 0]] < -0.9);
}

#[test]
fn test_cem_converges_on_concave_scorer() {
    let target = array![0.3, -0.3];
    let config = SearchConfig {
        num_cem: 60,
        cem_iter: 12,
        cem_elite: 6,
        ..SearchConfig::new(2)
    };
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    let scorer = TargetScorer::new(target.clone());
    let state = Array1::<f32>::zeros(4);

    let mut close = 0;
    for seed in 0..10 {
        let action = cem
            .optimize(&scorer, state.view(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert!(action.iter().all(|&x| (-1.0..=1.0).contains(&x)));
        if distance(&action, &target) < 0.05 {
            close += 1;
        }
    }
    assert!(close >= 9, "only {} of 10 runs converged", close);
    assert_eq!(scorer.calls(), 10 * 12);
}

#[test]
fn test_cem_without_elitism_tracks_population_mean() {
    let config = SearchConfig {
        num_cem: 40,
        cem_iter: 1,
        cem_elite: 40,
        ..SearchConfig::new(3)
    };
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    let scorer = TargetScorer::new(array![0.5, 0.5, 0.5]);
    let state = Array1::<f32>::zeros(2);

    let action = cem
        .optimize(&scorer, state.view(), &mut StdRng::seed_from_u64(21))
        .unwrap();

    let population = SamplingDistribution::new(3, config.bounds)
        .sample(40, config.bounds, &mut StdRng::seed_from_u64(21));
    let expected = population.mean_axis(Axis(0)).unwrap();
    assert!(distance(&action, &expected) < 1e-5);
}

#[test]
fn test_cem_without_elitism_runs_many_rounds() {
    let config = SearchConfig {
        num_cem: 25,
        cem_iter: 20,
        cem_elite: 25,
        ..SearchConfig::new(2)
    };
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    let scorer = TargetScorer::new(array![0.9, 0.9]);
    let report = cem
        .optimize_with_report(&scorer, Array1::<f32>::zeros(2).view(), &mut StdRng::seed_from_u64(2))
        .unwrap();
    assert_eq!(report.iterations.len(), 20);
    assert!(report.action.iter().all(|&x| (-1.0..=1.0).contains(&x)));
}

#[test]
fn test_cem_best_score_improves() {
    let config = SearchConfig {
        num_cem: 50,
        cem_iter: 8,
        cem_elite: 5,
        ..SearchConfig::new(2)
    };
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    let scorer = TargetScorer::new(array![-0.6, 0.1]);
    let report = cem
        .optimize_with_report(&scorer, Array1::<f32>::zeros(2).view(), &mut StdRng::seed_from_u64(4))
        .unwrap();

    let first = &report.iterations[0];
    let last = report.iterations.last().unwrap();
    assert!(last.best_score >= first.best_score);
    assert!(last.mean_score > first.mean_score);
    assert!(last.mean_std < first.mean_std);
}

#[test]
fn test_cem_respects_narrow_bounds() {
    let config = SearchConfig {
        num_cem: 30,
        cem_iter: 6,
        cem_elite: 3,
        bounds: ActionBounds::new(0.2, 0.4),
        ..SearchConfig::new(2)
    };
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    // optimum lies outside the box, so the search presses against an edge
    let scorer = TargetScorer::new(array![1.0, -1.0]);
    let action = cem
        .optimize(&scorer, Array1::<f32>::zeros(2).view(), &mut StdRng::seed_from_u64(6))
        .unwrap();
    assert!(action.iter().all(|&x| (0.2..=0.4).contains(&x)));
    assert!(action[0] > action[1]);
}
