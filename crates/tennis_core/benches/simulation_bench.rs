use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tennis_core::{
    MatchFormat, MatchSimulator, MonteCarloRunner, PlayerProfile, SimConfig, SimulationRequest,
};

fn profiles() -> (PlayerProfile, PlayerProfile) {
    (
        PlayerProfile::new("Server", 0.64, 0.77, 0.55, 0.10, 0.03, 0.37),
        PlayerProfile::new("Returner", 0.61, 0.71, 0.52, 0.05, 0.04, 0.41),
    )
}

fn single_match(c: &mut Criterion) {
    let (p1, p2) = profiles();
    let mut group = c.benchmark_group("single_match");
    for format in [MatchFormat::BestOf3, MatchFormat::BestOf5] {
        let sim = MatchSimulator::new(&p1, &p2, format);
        group.bench_function(BenchmarkId::from_parameter(format), |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            b.iter(|| black_box(sim.simulate(&mut rng)))
        });
    }
    group.finish();
}

fn monte_carlo_run(c: &mut Criterion) {
    let (p1, p2) = profiles();
    let mut group = c.benchmark_group("monte_carlo_run");
    group.sample_size(10);

    let sequential = MonteCarloRunner::new(SimConfig::sequential()).expect("valid config");
    let parallel = MonteCarloRunner::default();

    for trials in [1_000u32, 10_000] {
        let request = SimulationRequest::new(p1.clone(), p2.clone())
            .with_trials(trials)
            .with_seed(7);

        group.bench_function(BenchmarkId::new("sequential", trials), |b| {
            b.iter(|| black_box(sequential.run(&request)))
        });
        group.bench_function(BenchmarkId::new("parallel", trials), |b| {
            b.iter(|| black_box(parallel.run(&request)))
        });
    }
    group.finish();
}

criterion_group!(benches, single_match, monte_carlo_run);
criterion_main!(benches);
