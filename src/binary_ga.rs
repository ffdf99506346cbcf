//! Generational binary genetic algorithm engine.
//!
//! [`BinaryGa`] owns the population and every per-generation value derived
//! from it. A generation is evaluated, reported, and then advanced through
//! selection, crossover and mutation into a fresh buffer that replaces the
//! current population in one step. Build the engine with
//! [`BinaryGa::builder`] (or [`BinaryGa::new`] for the defaults) and call
//! [`BinaryGa::run`], or drive the phases by hand.

use crate::core::experiment::{RunReport, RunStats};
use crate::core::{Chromosome, Population, ShapeError};
use crate::ops::{
    evaluate, mutate_all, normalize, recombine, BitFlipMutation, CrossoverOperator, Evaluation,
    MutationOperator, Normalized, NormalizedSquare, Objective, OperatorError,
    RouletteWheelSelection, SelectionError, SelectionOperator, SinglePointCrossover,
};
use crate::report::{GenerationSnapshot, ReportAction, ReportError, Reporter};
use crate::{Settings, SettingsError};
use rand::RngCore;
use std::fmt::{self, Display, Formatter};
use tracing::instrument;

/// Lifecycle of a [`BinaryGa`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No population yet.
    Uninitialized,
    /// Initial population generated, not evaluated.
    Seeded,
    /// Decimals, objectives, fitness and statistics are current.
    Evaluated,
    /// The current generation has been handed to a reporter.
    Reported,
    /// A new population replaced the old one and awaits evaluation.
    Advancing,
    /// The run is over.
    Terminated,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Seeded => "seeded",
            Self::Evaluated => "evaluated",
            Self::Reported => "reported",
            Self::Advancing => "advancing",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Errors produced by the [`BinaryGa`] engine.
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    /// Wrapper around [`SettingsError`].
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Wrapper around [`ShapeError`].
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// Wrapper around [`OperatorError`].
    #[error(transparent)]
    Operator(#[from] OperatorError),
    /// Wrapper around [`SelectionError`].
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// A step was requested in a phase that does not allow it.
    #[error("cannot {operation} while the engine is {phase}")]
    Phase {
        /// The requested step.
        operation: &'static str,
        /// Phase the engine was in.
        phase: Phase,
    },
    /// The generation budget is used up.
    #[error("generation budget of {budget} is exhausted")]
    BudgetExhausted {
        /// Configured number of generations.
        budget: usize,
    },
    /// The reporter failed; the run is aborted.
    #[error("reporter failed: {0}")]
    Reporter(#[source] ReportError),
}

/// Builder returned by [`BinaryGa::builder`].
pub struct BinaryGaBuilder {
    settings: Settings,
    selection: Option<Box<dyn SelectionOperator>>,
    crossover: Option<Box<dyn CrossoverOperator>>,
    mutation: Option<Box<dyn MutationOperator>>,
    objective: Option<Box<dyn Objective>>,
}

impl BinaryGaBuilder {
    /// Replaces the selection operator.
    #[must_use]
    pub fn selection(mut self, operator: impl SelectionOperator + 'static) -> Self {
        self.selection = Some(Box::new(operator));
        self
    }

    /// Replaces the crossover operator.
    #[must_use]
    pub fn crossover(mut self, operator: impl CrossoverOperator + 'static) -> Self {
        self.crossover = Some(Box::new(operator));
        self
    }

    /// Replaces the mutation operator.
    #[must_use]
    pub fn mutation(mut self, operator: impl MutationOperator + 'static) -> Self {
        self.mutation = Some(Box::new(operator));
        self
    }

    /// Replaces the objective function.
    #[must_use]
    pub fn objective(mut self, objective: impl Objective + 'static) -> Self {
        self.objective = Some(Box::new(objective));
        self
    }

    /// Validates the settings and finalizes the engine.
    ///
    /// # Errors
    /// Returns [`GaError::Settings`] for invalid settings and
    /// [`GaError::Operator`] when a default operator cannot be built.
    pub fn build(self) -> Result<BinaryGa, GaError> {
        self.settings.validate()?;
        let selection = match self.selection {
            Some(operator) => operator,
            None => Box::new(RouletteWheelSelection::new(self.settings.elitism)),
        };
        let crossover = match self.crossover {
            Some(operator) => operator,
            None => Box::new(SinglePointCrossover::new(
                self.settings.crossover_probability,
            )?),
        };
        let mutation = match self.mutation {
            Some(operator) => operator,
            None => Box::new(BitFlipMutation::new(self.settings.mutation_probability)?),
        };
        let objective = self
            .objective
            .unwrap_or_else(|| Box::new(NormalizedSquare));
        Ok(BinaryGa {
            settings: self.settings,
            selection,
            crossover,
            mutation,
            objective,
            phase: Phase::Uninitialized,
            generation: 0,
            population: None,
            evaluated: None,
            best: None,
            stats: RunStats::new(),
        })
    }
}

struct Evaluated {
    evaluation: Evaluation,
    normalized: Normalized,
}

#[derive(Debug, Clone)]
struct Best {
    chromosome: Chromosome,
    decimal: u64,
    objective: f64,
}

/// Generational GA over fixed-length bit strings.
///
/// # Examples
/// ```
/// use bitga::{BinaryGa, Settings, Silent};
/// use rand::SeedableRng;
///
/// let mut settings = Settings::default();
/// settings.generations = 10;
/// settings.elitism = true;
/// let mut ga = BinaryGa::new(settings).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let report = ga.run(&mut rng, &mut Silent).unwrap();
/// assert_eq!(report.generations, 10);
/// assert_eq!(report.stats.generations(), 11);
/// assert!((0.0..=1.0).contains(&report.best_objective));
/// ```
pub struct BinaryGa {
    settings: Settings,
    selection: Box<dyn SelectionOperator>,
    crossover: Box<dyn CrossoverOperator>,
    mutation: Box<dyn MutationOperator>,
    objective: Box<dyn Objective>,
    phase: Phase,
    generation: usize,
    population: Option<Population>,
    evaluated: Option<Evaluated>,
    best: Option<Best>,
    stats: RunStats,
}

impl BinaryGa {
    /// Starts a builder with default operators derived from `settings`.
    #[must_use]
    pub fn builder(settings: Settings) -> BinaryGaBuilder {
        BinaryGaBuilder {
            settings,
            selection: None,
            crossover: None,
            mutation: None,
            objective: None,
        }
    }

    /// Builds an engine with the default operators.
    ///
    /// # Errors
    /// See [`BinaryGaBuilder::build`].
    pub fn new(settings: Settings) -> Result<Self, GaError> {
        Self::builder(settings).build()
    }

    /// The run configuration.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the current generation, `0` being the initial population.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The current population, once seeded.
    #[must_use]
    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    /// Generates the initial population.
    ///
    /// # Errors
    /// Returns [`GaError::Phase`] unless the engine is uninitialized.
    #[instrument(level = "debug", skip_all)]
    pub fn seed(&mut self, rng: &mut dyn RngCore) -> Result<(), GaError> {
        self.expect_phase("seed", &[Phase::Uninitialized])?;
        let population = Population::random(
            self.settings.population_size,
            self.settings.chromosome_length,
            rng,
        )?;
        self.install_seed(population);
        Ok(())
    }

    /// Uses `population` as the initial population.
    ///
    /// # Errors
    /// Returns [`GaError::Phase`] unless the engine is uninitialized, and
    /// [`GaError::Shape`] when the population does not match the settings.
    pub fn seed_with(&mut self, population: Population) -> Result<(), GaError> {
        self.expect_phase("seed", &[Phase::Uninitialized])?;
        self.check_shape(&population)?;
        self.install_seed(population);
        Ok(())
    }

    /// Computes decimals, objectives, fitness and both statistics bundles for
    /// the current population.
    ///
    /// # Errors
    /// Returns [`GaError::Phase`] unless the engine is seeded or advancing.
    #[instrument(level = "debug", skip_all, fields(generation = self.generation))]
    pub fn evaluate(&mut self) -> Result<(), GaError> {
        self.expect_phase("evaluate", &[Phase::Seeded, Phase::Advancing])?;
        let population = self.population.as_ref().ok_or(GaError::Phase {
            operation: "evaluate",
            phase: self.phase,
        })?;
        let evaluation = evaluate(population, self.objective.as_ref());
        let normalized = normalize(&evaluation.objectives, &evaluation.stats);

        let best_idx = best_objective_index(&evaluation.objectives);
        let improved = self
            .best
            .as_ref()
            .map_or(true, |best| evaluation.objectives[best_idx] > best.objective);
        if improved {
            self.best = Some(Best {
                chromosome: population.chromosomes()[best_idx].clone(),
                decimal: evaluation.decimals[best_idx],
                objective: evaluation.objectives[best_idx],
            });
        }

        tracing::info!(
            generation = self.generation,
            best = evaluation.stats.max,
            mean = evaluation.stats.mean,
            worst = evaluation.stats.min,
            best_chromosome = %evaluation.best_bits,
            "generation evaluated"
        );
        self.stats.record(&evaluation.stats);
        self.evaluated = Some(Evaluated {
            evaluation,
            normalized,
        });
        self.set_phase(Phase::Evaluated);
        Ok(())
    }

    /// View of the current generation, available once it has been evaluated.
    #[must_use]
    pub fn snapshot(&self) -> Option<GenerationSnapshot<'_>> {
        let population = self.population.as_ref()?;
        let evaluated = self.evaluated.as_ref()?;
        Some(GenerationSnapshot {
            generation: self.generation,
            population,
            evaluation: &evaluated.evaluation,
            normalized: &evaluated.normalized,
        })
    }

    /// Hands the current generation to `reporter`.
    ///
    /// # Errors
    /// Returns [`GaError::Phase`] unless the engine was just evaluated, and
    /// [`GaError::Reporter`] when the reporter fails.
    pub fn report<P: Reporter + ?Sized>(
        &mut self,
        reporter: &mut P,
    ) -> Result<ReportAction, GaError> {
        self.expect_phase("report", &[Phase::Evaluated])?;
        let snapshot = self.snapshot().ok_or(GaError::Phase {
            operation: "report",
            phase: self.phase,
        })?;
        let action = reporter.report(&snapshot).map_err(GaError::Reporter)?;
        self.set_phase(Phase::Reported);
        Ok(action)
    }

    /// Breeds the next generation: selection, crossover, mutation, then
    /// replacement of the whole population.
    ///
    /// Elite positions, when the selection reports any, are copied verbatim
    /// and skip mutation.
    ///
    /// # Errors
    /// Returns [`GaError::Phase`] unless the current generation has been
    /// evaluated, [`GaError::BudgetExhausted`] once the generation budget is
    /// reached, and any operator error.
    #[instrument(level = "debug", skip_all, fields(generation = self.generation))]
    pub fn advance(&mut self, rng: &mut dyn RngCore) -> Result<(), GaError> {
        self.expect_phase("advance", &[Phase::Evaluated, Phase::Reported])?;
        if self.generation >= self.settings.generations {
            return Err(GaError::BudgetExhausted {
                budget: self.settings.generations,
            });
        }
        let population = self.population.as_ref().ok_or(GaError::Phase {
            operation: "advance",
            phase: self.phase,
        })?;
        let evaluated = self.evaluated.as_ref().ok_or(GaError::Phase {
            operation: "advance",
            phase: self.phase,
        })?;

        let selection = self.selection.select(&evaluated.normalized.fitness, rng)?;
        tracing::debug!(parents = ?selection.parents, elites = ?selection.elites, "parents selected");
        let mut offspring = recombine(self.crossover.as_ref(), population, &selection, rng)?;
        let elite_count = selection.elite_count().min(offspring.len());
        let mutated = mutate_all(self.mutation.as_ref(), &mut offspring[elite_count..], rng)?;
        tracing::debug!(mutated, "offspring mutated");

        let next = Population::new(offspring)?;
        self.check_shape(&next)?;
        self.population = Some(next);
        self.evaluated = None;
        self.generation += 1;
        self.set_phase(Phase::Advancing);
        Ok(())
    }

    /// Runs evaluate → report → advance until the generation budget is spent
    /// or the reporter asks to stop.
    ///
    /// Seeds the engine from `rng` first unless a population was installed
    /// with [`Self::seed_with`].
    ///
    /// # Errors
    /// Propagates any [`GaError`] raised along the way.
    pub fn run<G, P>(&mut self, rng: &mut G, reporter: &mut P) -> Result<RunReport, GaError>
    where
        G: RngCore,
        P: Reporter + ?Sized,
    {
        self.expect_phase("run", &[Phase::Uninitialized, Phase::Seeded])?;
        if self.phase == Phase::Uninitialized {
            self.seed(rng)?;
        }
        let mut cancelled = false;
        loop {
            self.evaluate()?;
            if self.report(reporter)? == ReportAction::Stop {
                tracing::info!(generation = self.generation, "run stopped by reporter");
                cancelled = self.generation < self.settings.generations;
                break;
            }
            if self.generation >= self.settings.generations {
                break;
            }
            self.advance(rng)?;
        }
        self.set_phase(Phase::Terminated);
        self.finish(cancelled)
    }

    fn finish(&mut self, cancelled: bool) -> Result<RunReport, GaError> {
        let final_population = self
            .population
            .clone()
            .ok_or(ShapeError::EmptyPopulation)?;
        let best = self.best.clone().ok_or(GaError::Phase {
            operation: "finish",
            phase: self.phase,
        })?;
        Ok(RunReport {
            generations: self.generation,
            cancelled,
            best_chromosome: best.chromosome,
            best_decimal: best.decimal,
            best_objective: best.objective,
            final_population,
            stats: self.stats.clone(),
        })
    }

    fn check_shape(&self, population: &Population) -> Result<(), ShapeError> {
        population.ensure_size(self.settings.population_size)?;
        if population.chromosome_length() != self.settings.chromosome_length {
            return Err(ShapeError::LengthMismatch {
                index: 0,
                expected: self.settings.chromosome_length,
                found: population.chromosome_length(),
            });
        }
        Ok(())
    }

    fn install_seed(&mut self, population: Population) {
        self.population = Some(population);
        self.generation = 0;
        self.best = None;
        self.stats = RunStats::new();
        self.set_phase(Phase::Seeded);
    }

    fn expect_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), GaError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(GaError::Phase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }
}

fn best_objective_index(objectives: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &value) in objectives.iter().enumerate() {
        if value > objectives[best] {
            best = idx;
        }
    }
    best
}
