//! Per-generation statistics and run-level records.
//!
//! Statistics are recomputed from scratch every generation and handed around
//! as plain values; nothing in here is updated in place by the operators.

use super::{Chromosome, Population};
use serde::{Deserialize, Serialize};

/// Total, minimum, maximum and mean of one value space (objective or fitness).
///
/// # Examples
/// ```
/// use bitga::Statistics;
/// let stats = Statistics::from_values(&[0.0, 1.0, 0.5]).unwrap();
/// assert_eq!(stats.total, 1.5);
/// assert_eq!(stats.min, 0.0);
/// assert_eq!(stats.max, 1.0);
/// assert_eq!(stats.mean, 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Sum of all values.
    pub total: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// `total / N`.
    pub mean: f64,
}

impl Statistics {
    /// Scans `values` once, seeding every accumulator with the first value.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, rest) = values.split_first()?;
        let mut stats = Self {
            total: first,
            min: first,
            max: first,
            mean: first,
        };
        for &value in rest {
            stats.total += value;
            if value < stats.min {
                stats.min = value;
            }
            if value > stats.max {
                stats.max = value;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        {
            stats.mean = stats.total / values.len() as f64;
        }
        Some(stats)
    }

    /// Divides every field by `divisor`.
    #[must_use]
    pub fn scaled(&self, divisor: f64) -> Self {
        Self {
            total: self.total / divisor,
            min: self.min / divisor,
            max: self.max / divisor,
            mean: self.mean / divisor,
        }
    }
}

/// One line of the generation log: the best bit-string and the objective
/// extremes of a generation.
///
/// A summary exists for every generation, the initial one included, so a
/// log built from [`RunHistory`](crate::RunHistory) has a data record for
/// generation 0. Logs that start their data at generation 1 and write only
/// the header for the initial population have one record fewer.
///
/// # Examples
/// ```
/// use bitga::GenerationSummary;
/// let summary = GenerationSummary {
///     generation: 3,
///     best_chromosome: "1111".to_string(),
///     max: 1.0,
///     min: 0.0,
///     mean: 0.3755,
/// };
/// assert_eq!(summary.to_record(), "\"1111\";1;0;0.3755");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation index, `0` being the initial population.
    pub generation: usize,
    /// Binary form of the largest decoded value, without zero padding.
    pub best_chromosome: String,
    /// Largest objective value.
    pub max: f64,
    /// Smallest objective value.
    pub min: f64,
    /// Mean objective value.
    pub mean: f64,
}

impl GenerationSummary {
    /// Column names matching [`Self::to_record`].
    pub const HEADER: &'static str = "chromosome;max;min;mean";

    /// Renders the summary as a `;`-delimited record with a quoted bit-string.
    #[must_use]
    pub fn to_record(&self) -> String {
        format!(
            "\"{}\";{};{};{}",
            self.best_chromosome, self.max, self.min, self.mean
        )
    }
}

/// Time-series metrics captured during a run.
///
/// # Examples
/// ```
/// use bitga::RunStats;
/// let stats = RunStats::new();
/// assert_eq!(stats.generations(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Largest objective value per generation.
    pub best_objective: Vec<f64>,
    /// Mean objective value per generation.
    pub mean_objective: Vec<f64>,
    /// Smallest objective value per generation.
    pub worst_objective: Vec<f64>,
}

impl RunStats {
    /// Creates an empty set of run statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the objective statistics of one generation.
    pub fn record(&mut self, objective: &Statistics) {
        self.best_objective.push(objective.max);
        self.mean_objective.push(objective.mean);
        self.worst_objective.push(objective.min);
    }

    /// Returns the number of generations tracked.
    #[must_use]
    pub fn generations(&self) -> usize {
        self.best_objective.len()
    }
}

/// Outcome of [`BinaryGa::run`](crate::BinaryGa::run).
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Index of the last generation that was evaluated and reported.
    pub generations: usize,
    /// Whether the reporter stopped the run before the generation budget.
    pub cancelled: bool,
    /// Best chromosome seen in any generation.
    pub best_chromosome: Chromosome,
    /// Decoded value of [`Self::best_chromosome`].
    pub best_decimal: u64,
    /// Objective value of [`Self::best_chromosome`].
    pub best_objective: f64,
    /// Population alive when the run ended.
    pub final_population: Population,
    /// Per-generation objective statistics.
    pub stats: RunStats,
}
