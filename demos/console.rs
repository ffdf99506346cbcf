use bitga::report::from_fn;
use bitga::{BinaryGa, GenerationSummary, ReportAction, Settings};
use std::error::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Usage: cargo run --example console [settings.toml]
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    let mut rng = settings.rng();
    let mut ga = BinaryGa::new(settings)?;

    let mut records = vec![GenerationSummary::HEADER.to_owned()];
    let mut reporter = from_fn(|snapshot| {
        println!("Generation {}", snapshot.generation);
        println!(
            "{:>4} | {:<32} | {:>12} | {:>8} | {:>8}",
            "#", "chromosome", "decimal", "f(x)", "fitness"
        );
        for (idx, chromosome) in snapshot.population.iter().enumerate() {
            println!(
                "{:>4} | {:<32} | {:>12} | {:>8.4} | {:>8.4}",
                idx,
                chromosome.to_string(),
                snapshot.decimals()[idx],
                snapshot.objectives()[idx],
                snapshot.fitness()[idx],
            );
        }
        let objective = snapshot.objective_stats();
        let fitness = snapshot.fitness_stats();
        println!(
            "f(x): total {:.4} max {:.4} min {:.4} mean {:.4}",
            objective.total, objective.max, objective.min, objective.mean
        );
        println!(
            "fitness: total {:.4} max {:.4} min {:.4} mean {:.4}\n",
            fitness.total, fitness.max, fitness.min, fitness.mean
        );
        records.push(snapshot.summary().to_record());
        Ok(ReportAction::Continue)
    });

    let report = ga.run(&mut rng, &mut reporter)?;
    for record in &records {
        println!("{record}");
    }
    println!(
        "best chromosome: {} => {} (f = {:.4})",
        report.best_chromosome, report.best_decimal, report.best_objective
    );
    Ok(())
}
