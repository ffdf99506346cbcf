//! Conversion of objective values into selection-proportional fitness.

use crate::core::experiment::Statistics;
use tracing::instrument;

/// Fitness per individual plus the fitness-space statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// `objective[i] / Σobjective`.
    pub fitness: Vec<f64>,
    /// `total` is `Σfitness`; `min`, `max` and `mean` are the objective
    /// statistics divided by the objective total.
    pub stats: Statistics,
    /// Set when every objective was zero and uniform fitness was assigned.
    pub uniform_fallback: bool,
}

/// Divides every objective by the objective total.
///
/// When the objective total is zero (every chromosome decodes to zero) each
/// individual receives `1/N` and the statistics become
/// `{ total: 1, min: 1/N, max: 1/N, mean: 1/N }`.
///
/// # Examples
/// ```
/// use bitga::ops::normalize;
/// use bitga::Statistics;
///
/// let objectives = [1.0, 3.0];
/// let stats = Statistics::from_values(&objectives).unwrap();
/// let normalized = normalize(&objectives, &stats);
/// assert_eq!(normalized.fitness, vec![0.25, 0.75]);
/// assert_eq!(normalized.stats.max, 0.75);
/// ```
#[instrument(level = "debug", skip_all, fields(total = objective_stats.total))]
pub fn normalize(objectives: &[f64], objective_stats: &Statistics) -> Normalized {
    let total = objective_stats.total;
    if total <= 0.0 || !total.is_finite() {
        tracing::warn!(
            total,
            population_size = objectives.len(),
            "objective total is not positive, assigning uniform fitness"
        );
        return uniform(objectives.len());
    }

    let fitness: Vec<f64> = objectives.iter().map(|objective| objective / total).collect();
    let mut stats = objective_stats.scaled(total);
    stats.total = fitness.iter().sum();

    Normalized {
        fitness,
        stats,
        uniform_fallback: false,
    }
}

fn uniform(size: usize) -> Normalized {
    #[allow(clippy::cast_precision_loss)]
    let share = if size == 0 { 0.0 } else { 1.0 / size as f64 };
    Normalized {
        fitness: vec![share; size],
        stats: Statistics {
            total: 1.0,
            min: share,
            max: share,
            mean: share,
        },
        uniform_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_example_fitness() {
        let objectives = [0.0, 1.0, 0.2844, 0.2178];
        let stats = Statistics::from_values(&objectives).unwrap();
        let normalized = normalize(&objectives, &stats);
        let expected = [0.0, 0.6657, 0.1893, 0.1450];
        for (value, expected) in normalized.fitness.iter().zip(expected) {
            assert!((value - expected).abs() < 1e-4, "{value} vs {expected}");
        }
        assert!((normalized.stats.total - 1.0).abs() < 1e-12);
        assert!(!normalized.uniform_fallback);
    }

    #[test]
    fn statistics_are_scaled_objective_statistics() {
        let objectives = [0.5, 0.25, 0.25];
        let stats = Statistics::from_values(&objectives).unwrap();
        let normalized = normalize(&objectives, &stats);
        assert_eq!(normalized.stats.min, stats.min / stats.total);
        assert_eq!(normalized.stats.max, stats.max / stats.total);
        assert_eq!(normalized.stats.mean, stats.mean / stats.total);
    }

    #[test]
    fn zero_total_falls_back_to_uniform() {
        let objectives = [0.0; 4];
        let stats = Statistics::from_values(&objectives).unwrap();
        let normalized = normalize(&objectives, &stats);
        assert!(normalized.uniform_fallback);
        assert_eq!(normalized.fitness, vec![0.25; 4]);
        assert_eq!(normalized.stats.total, 1.0);
        assert_eq!(normalized.stats.min, 0.25);
        assert!(normalized.fitness.iter().all(|value| value.is_finite()));
    }

    proptest! {
        #[test]
        fn fitness_sums_to_one(objectives in proptest::collection::vec(0.0_f64..=1.0, 1..64)) {
            let stats = Statistics::from_values(&objectives).unwrap();
            let normalized = normalize(&objectives, &stats);
            let sum: f64 = normalized.fitness.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(normalized.fitness.iter().all(|value| *value >= 0.0));
        }
    }
}
