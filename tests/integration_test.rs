use ndarray::{array, Array1, Array2, ArrayView2, Axis};
use qsearch::agent::Agent;
use qsearch::config::SearchConfig;
use qsearch::encoder::TimestepEncoder;
use qsearch::error::Result;
use qsearch::scorer::QNetworkScorer;
use qsearch::search::{CrossEntropyOptimizer, UniformSampler};
use qsearch::types::Device;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn quadratic_scorer(target: Array1<f32>) -> impl Fn(ArrayView2<f32>, ArrayView2<f32>) -> Result<Array1<f32>> + Send + Sync {
    move |_states: ArrayView2<f32>, actions: ArrayView2<f32>| -> Result<Array1<f32>> {
        Ok((&actions - &target).mapv(|d| -d * d).sum_axis(Axis(1)))
    }
}

fn max_abs_diff(a: ndarray::ArrayView1<f32>, b: ndarray::ArrayView1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
}

#[test]
fn test_uniform_finds_quadratic_optimum() {
    init_tracing();
    let target = array![0.3f32, -0.3];
    let config = SearchConfig::builder()
        .action_size(2)
        .bounds(-1.0, 1.0)
        .num_uniform(1000)
        .build()
        .unwrap();
    let sampler = UniformSampler::new(config.uniform_config()).unwrap();
    let scorer = quadratic_scorer(target.clone());
    let states = Array2::<f32>::zeros((8, 10));

    let mut hits = 0;
    for seed in 0..5 {
        let best = sampler
            .optimize(&scorer, states.view(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        for row in best.outer_iter() {
            if max_abs_diff(row, target.view()) < 0.1 {
                hits += 1;
            }
        }
    }
    assert!(hits >= 38, "only {} of 40 searches landed near the optimum", hits);
}

#[test]
fn test_cem_finds_quadratic_optimum() {
    init_tracing();
    let target = array![0.3f32, -0.3];
    let config = SearchConfig::builder()
        .action_size(2)
        .bounds(-1.0, 1.0)
        .num_cem(50)
        .cem_iter(15)
        .cem_elite(5)
        .build()
        .unwrap();
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    let scorer = quadratic_scorer(target.clone());
    let state = Array1::<f32>::zeros(10);

    let mut hits = 0;
    for seed in 0..10 {
        let action = cem
            .optimize(&scorer, state.view(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        if max_abs_diff(action.view(), target.view()) < 0.02 {
            hits += 1;
        }
    }
    assert!(hits >= 9, "only {} of 10 CEM runs converged", hits);
}

#[test]
fn test_cem_zero_iterations_is_origin() {
    let config = SearchConfig::builder()
        .action_size(3)
        .cem_iter(0)
        .build()
        .unwrap();
    let cem = CrossEntropyOptimizer::new(config.cem_config()).unwrap();
    let scorer = quadratic_scorer(array![0.5, 0.5, 0.5]);
    let action = cem
        .optimize(&scorer, Array1::<f32>::zeros(2).view(), &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(action, Array1::<f32>::zeros(3));
}

#[test]
fn test_agent_with_network_scorer_round_trip() {
    init_tracing();
    let obs_shape = [1, 4, 4];
    let mut rng = StdRng::seed_from_u64(10);
    let scorer = QNetworkScorer::builder()
        .embedding_dim(TimestepEncoder::embedding_dim(&obs_shape))
        .action_size(2)
        .hidden_sizes(&[16])
        .build(&mut rng)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let scorer_path = dir.path().join("scorer.bin");

    let config = SearchConfig::builder()
        .action_size(2)
        .num_uniform(32)
        .num_cem(24)
        .cem_iter(4)
        .cem_elite(4)
        .device(Device::Parallel)
        .seed(5)
        .build()
        .unwrap();
    config.save_json(&config_path).unwrap();
    scorer.save(&scorer_path).unwrap();

    let mut original = Agent::new(config, TimestepEncoder, scorer).unwrap();
    let mut restored = Agent::new(
        SearchConfig::load_json(&config_path).unwrap(),
        TimestepEncoder,
        QNetworkScorer::load(&scorer_path).unwrap(),
    )
    .unwrap();

    let observation = ndarray::Array3::<f32>::from_shape_fn((1, 4, 4), |(_, h, w)| (h * 4 + w) as f32 / 16.0);
    let a = original.select_action(observation.view().into_dyn(), 2.0, true).unwrap();
    let b = restored.select_action(observation.view().into_dyn(), 2.0, true).unwrap();
    assert_eq!(a, b);

    let batch = observation.insert_axis(Axis(0));
    let q = restored
        .evaluate(batch.view().into_dyn(), array![2.0f32].view(), None)
        .unwrap();
    assert_eq!(q.len(), 1);
    assert!(q[0].is_finite());
}
