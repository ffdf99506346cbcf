use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use bitga::{BinaryGa, Settings, Silent};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn run_ga(settings: Settings) {
    let mut engine = BinaryGa::new(settings).expect("valid GA configuration");
    let mut rng = StdRng::seed_from_u64(42);
    engine
        .run(&mut rng, &mut Silent)
        .expect("optimization to succeed");
}

fn generations_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary-ga");
    for &population_size in &[10_usize, 50_usize, 100_usize] {
        group.bench_function(BenchmarkId::from_parameter(population_size), |b| {
            b.iter_batched(
                || Settings {
                    population_size,
                    generations: 200,
                    elitism: true,
                    ..Settings::default()
                },
                run_ga,
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, generations_benchmark);
criterion_main!(benches);
