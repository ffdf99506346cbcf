//! Per-generation reporting.
//!
//! The engine hands a [`GenerationSnapshot`] to a [`Reporter`] once per
//! generation, after evaluation and before the next population is bred.
//! Rendering tables or appending records to storage is left to the reporter;
//! the returned [`ReportAction`] is the only place a run can be stopped early.

use crate::core::experiment::{GenerationSummary, Statistics};
use crate::core::Population;
use crate::ops::{Evaluation, Normalized};

/// Error type reporters may fail with; it aborts the run.
pub type ReportError = Box<dyn std::error::Error + Send + Sync>;

/// What the engine should do after a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportAction {
    /// Breed the next generation.
    #[default]
    Continue,
    /// Stop the run after this generation.
    Stop,
}

/// Read-only view of one evaluated generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSnapshot<'a> {
    /// Generation index, `0` being the initial population.
    pub generation: usize,
    /// The evaluated population.
    pub population: &'a Population,
    /// Decoded values and objective scores.
    pub evaluation: &'a Evaluation,
    /// Fitness values and statistics.
    pub normalized: &'a Normalized,
}

impl<'a> GenerationSnapshot<'a> {
    /// Decoded value per chromosome.
    #[must_use]
    pub fn decimals(&self) -> &'a [u64] {
        &self.evaluation.decimals
    }

    /// Objective value per chromosome.
    #[must_use]
    pub fn objectives(&self) -> &'a [f64] {
        &self.evaluation.objectives
    }

    /// Fitness value per chromosome.
    #[must_use]
    pub fn fitness(&self) -> &'a [f64] {
        &self.normalized.fitness
    }

    /// Objective-space statistics.
    #[must_use]
    pub fn objective_stats(&self) -> &'a Statistics {
        &self.evaluation.stats
    }

    /// Fitness-space statistics.
    #[must_use]
    pub fn fitness_stats(&self) -> &'a Statistics {
        &self.normalized.stats
    }

    /// Binary form of the largest decoded value.
    #[must_use]
    pub fn best_bits(&self) -> &'a str {
        &self.evaluation.best_bits
    }

    /// Owned summary record of this generation.
    #[must_use]
    pub fn summary(&self) -> GenerationSummary {
        let stats = self.objective_stats();
        GenerationSummary {
            generation: self.generation,
            best_chromosome: self.best_bits().to_owned(),
            max: stats.max,
            min: stats.min,
            mean: stats.mean,
        }
    }
}

/// Consumer of per-generation snapshots.
pub trait Reporter {
    /// Receives one generation.
    ///
    /// # Errors
    /// Any error aborts the run and is surfaced as
    /// [`GaError::Reporter`](crate::GaError::Reporter).
    fn report(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<ReportAction, ReportError>;
}

impl<T: Reporter + ?Sized> Reporter for &mut T {
    fn report(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<ReportAction, ReportError> {
        (**self).report(snapshot)
    }
}

impl<T: Reporter + ?Sized> Reporter for Box<T> {
    fn report(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<ReportAction, ReportError> {
        (**self).report(snapshot)
    }
}

/// Reporter that ignores every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Reporter for Silent {
    fn report(&mut self, _snapshot: &GenerationSnapshot<'_>) -> Result<ReportAction, ReportError> {
        Ok(ReportAction::Continue)
    }
}

/// Reporter built from a closure, see [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnReporter<F> {
    callback: F,
}

/// Wraps a closure as a [`Reporter`].
///
/// # Examples
/// ```
/// use bitga::report::{from_fn, ReportAction};
///
/// let mut seen = Vec::new();
/// let mut reporter = from_fn(|snapshot| {
///     seen.push(snapshot.generation);
///     Ok(ReportAction::Continue)
/// });
/// # let _ = &mut reporter;
/// ```
pub fn from_fn<F>(callback: F) -> FnReporter<F>
where
    F: FnMut(&GenerationSnapshot<'_>) -> Result<ReportAction, ReportError>,
{
    FnReporter { callback }
}

impl<F> Reporter for FnReporter<F>
where
    F: FnMut(&GenerationSnapshot<'_>) -> Result<ReportAction, ReportError>,
{
    fn report(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<ReportAction, ReportError> {
        (self.callback)(snapshot)
    }
}

/// Collects a [`GenerationSummary`] per generation.
///
/// # Examples
/// ```
/// use bitga::{BinaryGa, RunHistory, Settings};
/// use rand::SeedableRng;
///
/// let mut settings = Settings::default();
/// settings.generations = 3;
/// let mut ga = BinaryGa::new(settings).unwrap();
/// let mut history = RunHistory::new();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// ga.run(&mut rng, &mut history).unwrap();
/// assert_eq!(history.summaries().len(), 4);
/// assert!(history.records().next().unwrap().starts_with('"'));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    summaries: Vec<GenerationSummary>,
}

impl RunHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Summaries in generation order.
    #[must_use]
    pub fn summaries(&self) -> &[GenerationSummary] {
        &self.summaries
    }

    /// `;`-delimited records in generation order, without the header.
    pub fn records(&self) -> impl Iterator<Item = String> + '_ {
        self.summaries.iter().map(GenerationSummary::to_record)
    }
}

impl Reporter for RunHistory {
    fn report(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<ReportAction, ReportError> {
        self.summaries.push(snapshot.summary());
        Ok(ReportAction::Continue)
    }
}
