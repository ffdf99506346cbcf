use bitga::ops::{Objective, SinglePointCrossover};
use bitga::report::from_fn;
use bitga::{BinaryGa, GaError, Phase, ReportAction, RunHistory, Settings, Silent};
use rand::SeedableRng;

#[test]
fn default_run_reports_twenty_one_generations() {
    let settings = Settings::default();
    let mut ga = BinaryGa::new(settings).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(13);
    let mut history = RunHistory::new();
    let report = ga.run(&mut rng, &mut history).unwrap();
    assert_eq!(report.generations, 20);
    assert_eq!(history.summaries().len(), 21);
    assert_eq!(report.stats.generations(), 21);
    assert_eq!(report.final_population.len(), 10);
    assert_eq!(report.final_population.chromosome_length(), 30);
    for summary in history.summaries() {
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
        assert!((0.0..=1.0).contains(&summary.max));
    }
}

#[test]
fn identical_seeds_give_identical_runs() {
    let run = || {
        let mut ga = BinaryGa::new(Settings::default()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let mut history = RunHistory::new();
        ga.run(&mut rng, &mut history).unwrap();
        history.records().collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn objective_values_stay_rounded() {
    let mut settings = Settings::default();
    settings.generations = 5;
    let mut ga = BinaryGa::new(settings).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(2);
    let mut reporter = from_fn(|snapshot| {
        for &value in snapshot.objectives() {
            let scaled = value * 10_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "{value} is not rounded");
        }
        let total: f64 = snapshot.fitness().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        Ok(ReportAction::Continue)
    });
    ga.run(&mut rng, &mut reporter).unwrap();
}

struct Ones;

impl Objective for Ones {
    fn score(&self, decimal: u64, _max: u64) -> f64 {
        f64::from(decimal.count_ones())
    }
}

#[test]
fn custom_operators_are_used() {
    let mut settings = Settings::default();
    settings.chromosome_length = 16;
    settings.generations = 3;
    let mut ga = BinaryGa::builder(settings)
        .objective(Ones)
        .crossover(SinglePointCrossover::new(100).unwrap())
        .build()
        .unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(21);
    let report = ga.run(&mut rng, &mut Silent).unwrap();
    assert_eq!(
        report.best_objective,
        f64::from(report.best_chromosome.decode().count_ones())
    );
}

#[test]
fn invalid_settings_are_rejected_at_build() {
    let mut settings = Settings::default();
    settings.population_size = 9;
    assert!(matches!(BinaryGa::new(settings), Err(GaError::Settings(_))));
}

#[test]
fn a_finished_run_cannot_be_restarted() {
    let mut settings = Settings::default();
    settings.generations = 1;
    let mut ga = BinaryGa::new(settings).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    ga.run(&mut rng, &mut Silent).unwrap();
    assert_eq!(ga.phase(), Phase::Terminated);
    assert!(matches!(
        ga.run(&mut rng, &mut Silent),
        Err(GaError::Phase { operation: "run", .. })
    ));
}
