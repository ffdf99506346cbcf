//! Single-point crossover for binary chromosomes.

use crate::core::{Chromosome, Population, ShapeError};
use crate::ops::selection::Selection;
use crate::ops::{chance, check_probability, OperatorError};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::instrument;

/// Produces two offspring from two parents.
///
/// # Examples
/// ```
/// use bitga::ops::CrossoverOperator;
/// use bitga::{Chromosome, ShapeError};
/// use rand::SeedableRng;
///
/// struct Swap;
///
/// impl CrossoverOperator for Swap {
///     fn crossover(
///         &self,
///         parent_a: &Chromosome,
///         parent_b: &Chromosome,
///         _rng: &mut dyn rand::RngCore,
///     ) -> Result<(Chromosome, Chromosome), ShapeError> {
///         Ok((parent_b.clone(), parent_a.clone()))
///     }
/// }
///
/// let parent_a: Chromosome = "0000".parse().unwrap();
/// let parent_b: Chromosome = "1111".parse().unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let (child_a, child_b) = Swap.crossover(&parent_a, &parent_b, &mut rng).unwrap();
/// assert_eq!(child_a, parent_b);
/// assert_eq!(child_b, parent_a);
/// ```
pub trait CrossoverOperator: Send + Sync {
    /// Recombines two parents.
    ///
    /// # Errors
    /// Returns [`ShapeError`] when the parents have different lengths.
    fn crossover(
        &self,
        parent_a: &Chromosome,
        parent_b: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome, Chromosome), ShapeError>;
}

impl<T: CrossoverOperator + ?Sized> CrossoverOperator for &T {
    fn crossover(
        &self,
        parent_a: &Chromosome,
        parent_b: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome, Chromosome), ShapeError> {
        (**self).crossover(parent_a, parent_b, rng)
    }
}

impl<T: CrossoverOperator + ?Sized> CrossoverOperator for Box<T> {
    fn crossover(
        &self,
        parent_a: &Chromosome,
        parent_b: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome, Chromosome), ShapeError> {
        (**self).crossover(parent_a, parent_b, rng)
    }
}

impl<T: CrossoverOperator + ?Sized> CrossoverOperator for Arc<T> {
    fn crossover(
        &self,
        parent_a: &Chromosome,
        parent_b: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome, Chromosome), ShapeError> {
        (**self).crossover(parent_a, parent_b, rng)
    }
}

/// Exchanges tails at a uniformly drawn cut point with a given probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinglePointCrossover {
    probability: u32,
}

impl SinglePointCrossover {
    /// Creates the operator; `probability` is a percentage in `0..=100`.
    ///
    /// # Errors
    /// Returns [`OperatorError::InvalidProbability`] above 100.
    pub fn new(probability: u32) -> Result<Self, OperatorError> {
        check_probability("single-point crossover", probability)?;
        Ok(Self { probability })
    }

    /// Configured crossover percentage.
    #[must_use]
    pub fn probability(&self) -> u32 {
        self.probability
    }
}

impl CrossoverOperator for SinglePointCrossover {
    fn crossover(
        &self,
        parent_a: &Chromosome,
        parent_b: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome, Chromosome), ShapeError> {
        if parent_a.len() != parent_b.len() {
            return Err(ShapeError::LengthMismatch {
                index: 1,
                expected: parent_a.len(),
                found: parent_b.len(),
            });
        }
        if parent_a.len() < 2 || !chance(rng, self.probability) {
            return Ok((parent_a.clone(), parent_b.clone()));
        }
        let cut = rng.gen_range(1..parent_a.len());
        single_point(parent_a, parent_b, cut)
    }
}

/// Builds `a[..cut] + b[cut..]` and `b[..cut] + a[cut..]`.
///
/// # Examples
/// ```
/// use bitga::ops::single_point;
/// use bitga::Chromosome;
///
/// let a: Chromosome = "0000".parse().unwrap();
/// let b: Chromosome = "1111".parse().unwrap();
/// let (child_a, child_b) = single_point(&a, &b, 1).unwrap();
/// assert_eq!(child_a.to_string(), "0111");
/// assert_eq!(child_b.to_string(), "1000");
/// ```
///
/// # Errors
/// Returns [`ShapeError`] when the parents differ in length or `cut` is past
/// the end.
pub fn single_point(
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    cut: usize,
) -> Result<(Chromosome, Chromosome), ShapeError> {
    let length = parent_a.len();
    if parent_b.len() != length {
        return Err(ShapeError::LengthMismatch {
            index: 1,
            expected: length,
            found: parent_b.len(),
        });
    }
    if cut > length {
        return Err(ShapeError::GeneOutOfRange { index: cut, length });
    }
    let (head_a, tail_a) = parent_a.bits().split_at(cut);
    let (head_b, tail_b) = parent_b.bits().split_at(cut);
    let child_a = Chromosome::new([head_a, tail_b].concat());
    let child_b = Chromosome::new([head_b, tail_a].concat());
    Ok((child_a, child_b))
}

/// Builds the next generation's chromosomes from a [`Selection`].
///
/// Elite positions are copied verbatim from the current population. The
/// remaining positions are taken in pairs `(k, k+1)` and recombined with
/// `operator`. The current population is only read; offspring go to a fresh
/// buffer.
///
/// # Errors
/// Returns [`OperatorError`] when a parent index is unknown, positions cannot
/// be paired, or the operator rejects the parents.
#[instrument(level = "debug", skip_all, fields(population_size = population.len()))]
pub fn recombine(
    operator: &dyn CrossoverOperator,
    population: &Population,
    selection: &Selection,
    rng: &mut dyn RngCore,
) -> Result<Vec<Chromosome>, OperatorError> {
    let elite_count = selection.elite_count().min(selection.parents.len());
    let mut offspring = Vec::with_capacity(selection.parents.len());
    for position in 0..elite_count {
        offspring.push(parent_at(population, selection, position)?.clone());
    }

    let paired = &selection.parents[elite_count..];
    if paired.len() % 2 != 0 {
        return Err(OperatorError::UnpairedParent {
            position: selection.parents.len() - 1,
        });
    }
    for position in (elite_count..selection.parents.len()).step_by(2) {
        let (child_a, child_b) = operator.crossover(
            parent_at(population, selection, position)?,
            parent_at(population, selection, position + 1)?,
            rng,
        )?;
        offspring.push(child_a);
        offspring.push(child_b);
    }
    Ok(offspring)
}

fn parent_at<'a>(
    population: &'a Population,
    selection: &Selection,
    position: usize,
) -> Result<&'a Chromosome, OperatorError> {
    let index = selection.parents[position];
    population.get(index).ok_or(OperatorError::UnknownParent {
        index,
        population_size: population.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chromosome(bits: &str) -> Chromosome {
        bits.parse().unwrap()
    }

    #[test]
    fn cut_point_exchanges_tails() {
        let (child_a, child_b) =
            single_point(&chromosome("000000"), &chromosome("111111"), 4).unwrap();
        assert_eq!(child_a.to_string(), "000011");
        assert_eq!(child_b.to_string(), "111100");
    }

    #[test]
    fn zero_probability_copies_parents() {
        let operator = SinglePointCrossover::new(0).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let a = chromosome("0101");
        let b = chromosome("1010");
        for _ in 0..100 {
            let (child_a, child_b) = operator.crossover(&a, &b, &mut rng).unwrap();
            assert_eq!(child_a, a);
            assert_eq!(child_b, b);
        }
    }

    #[test]
    fn full_probability_always_cuts_inside() {
        let operator = SinglePointCrossover::new(100).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let a = Chromosome::zeros(30);
        let b = Chromosome::new(vec![true; 30]);
        for _ in 0..1_000 {
            let (child_a, child_b) = operator.crossover(&a, &b, &mut rng).unwrap();
            let cut = child_a.iter().take_while(|bit| !**bit).count();
            assert!((1..30).contains(&cut), "cut = {cut}");
            assert_eq!(child_a.to_string().len(), 30);
            assert_eq!(child_b.iter().take_while(|bit| **bit).count(), cut);
        }
    }

    #[test]
    fn empirical_rate_matches_probability() {
        let operator = SinglePointCrossover::new(75).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let a = Chromosome::zeros(30);
        let b = Chromosome::new(vec![true; 30]);
        let trials = 10_000;
        let crossed = (0..trials)
            .filter(|_| {
                let (child_a, _) = operator.crossover(&a, &b, &mut rng).unwrap();
                child_a != a
            })
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = crossed as f64 / f64::from(trials);
        assert!((rate - 0.75).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn probability_above_hundred_is_rejected() {
        assert!(SinglePointCrossover::new(101).is_err());
    }

    #[test]
    fn recombine_keeps_elites_verbatim() {
        let population = Population::new(vec![
            chromosome("0000"),
            chromosome("1111"),
            chromosome("1000"),
            chromosome("0111"),
        ])
        .unwrap();
        let selection = Selection {
            parents: vec![1, 2, 0, 3],
            elites: Some([1, 2]),
        };
        let operator = SinglePointCrossover::new(100).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let offspring = recombine(&operator, &population, &selection, &mut rng).unwrap();
        assert_eq!(offspring.len(), 4);
        assert_eq!(offspring[0], chromosome("1111"));
        assert_eq!(offspring[1], chromosome("1000"));
        // Crossing 0000 with 0111 only ever produces prefixes of one and the other.
        assert_eq!(offspring[2].decode() + offspring[3].decode(), 7);
    }

    #[test]
    fn recombine_rejects_odd_pairings() {
        let population =
            Population::new(vec![chromosome("00"), chromosome("11"), chromosome("01")]).unwrap();
        let selection = Selection {
            parents: vec![0, 1, 2],
            elites: None,
        };
        let operator = SinglePointCrossover::new(0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let err = recombine(&operator, &population, &selection, &mut rng).unwrap_err();
        assert!(matches!(err, OperatorError::UnpairedParent { position: 2 }));
    }
}
