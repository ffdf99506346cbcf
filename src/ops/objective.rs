//! Objective evaluation for binary populations.

use crate::core::experiment::Statistics;
use crate::core::{max_value, Population};
use std::sync::Arc;
use tracing::instrument;

/// Number of decimal places objective values are rounded to.
pub const OBJECTIVE_DECIMALS: i32 = 4;

/// Scores a decoded chromosome.
///
/// Implementations receive the decoded value and the largest value the
/// chromosome length can represent; the result is rounded by [`evaluate`].
///
/// # Examples
/// ```
/// use bitga::ops::Objective;
///
/// struct Linear;
///
/// impl Objective for Linear {
///     fn score(&self, decimal: u64, max: u64) -> f64 {
///         decimal as f64 / max as f64
///     }
/// }
///
/// assert_eq!(Linear.score(5, 10), 0.5);
/// ```
pub trait Objective: Send + Sync {
    /// Returns the raw objective value of `decimal`.
    fn score(&self, decimal: u64, max: u64) -> f64;
}

impl<T: Objective + ?Sized> Objective for &T {
    fn score(&self, decimal: u64, max: u64) -> f64 {
        (**self).score(decimal, max)
    }
}

impl<T: Objective + ?Sized> Objective for Box<T> {
    fn score(&self, decimal: u64, max: u64) -> f64 {
        (**self).score(decimal, max)
    }
}

impl<T: Objective + ?Sized> Objective for Arc<T> {
    fn score(&self, decimal: u64, max: u64) -> f64 {
        (**self).score(decimal, max)
    }
}

/// `f(x) = (x / (2^L − 1))²`, maximised by the all-ones chromosome.
///
/// # Examples
/// ```
/// use bitga::ops::{NormalizedSquare, Objective};
/// assert_eq!(NormalizedSquare.score(15, 15), 1.0);
/// assert_eq!(NormalizedSquare.score(0, 15), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedSquare;

impl Objective for NormalizedSquare {
    #[allow(clippy::cast_precision_loss)]
    fn score(&self, decimal: u64, max: u64) -> f64 {
        let ratio = decimal as f64 / max as f64;
        ratio * ratio
    }
}

/// Decoded values and objective scores of one population.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Decoded value per chromosome.
    pub decimals: Vec<u64>,
    /// Rounded objective value per chromosome.
    pub objectives: Vec<f64>,
    /// Objective statistics.
    pub stats: Statistics,
    /// Index of the chromosome with the largest decoded value (first on ties).
    pub best_index: usize,
    /// Binary form of the largest decoded value without zero padding; `"0"`
    /// when every chromosome decodes to zero.
    pub best_bits: String,
}

/// Rounds `value` to [`OBJECTIVE_DECIMALS`] places, halves away from zero.
///
/// # Examples
/// ```
/// assert_eq!(bitga::ops::round_objective(0.284_444), 0.2844);
/// ```
#[must_use]
pub fn round_objective(value: f64) -> f64 {
    let scale = 10_f64.powi(OBJECTIVE_DECIMALS);
    (value * scale).round() / scale
}

/// Decodes every chromosome and scores it with `objective`.
///
/// # Examples
/// ```
/// use bitga::ops::{evaluate, NormalizedSquare};
/// use bitga::Population;
///
/// let population = Population::new(vec![
///     "0000".parse().unwrap(),
///     "1111".parse().unwrap(),
///     "1000".parse().unwrap(),
///     "0111".parse().unwrap(),
/// ])
/// .unwrap();
/// let evaluation = evaluate(&population, &NormalizedSquare);
/// assert_eq!(evaluation.decimals, vec![0, 15, 8, 7]);
/// assert_eq!(evaluation.objectives, vec![0.0, 1.0, 0.2844, 0.2178]);
/// assert_eq!(evaluation.best_bits, "1111");
/// ```
#[instrument(level = "debug", skip_all, fields(population_size = population.len()))]
pub fn evaluate(population: &Population, objective: &dyn Objective) -> Evaluation {
    let max = max_value(population.chromosome_length());
    let decimals = population.decimals();
    let objectives: Vec<f64> = decimals
        .iter()
        .map(|&decimal| round_objective(objective.score(decimal, max)))
        .collect();

    let mut best_index = 0;
    for (idx, &decimal) in decimals.iter().enumerate() {
        if decimal > decimals[best_index] {
            best_index = idx;
        }
    }
    let best_bits = format!("{:b}", decimals.get(best_index).copied().unwrap_or(0));
    let stats = Statistics::from_values(&objectives).unwrap_or_default();

    Evaluation {
        decimals,
        objectives,
        stats,
        best_index,
        best_bits,
    }
}
