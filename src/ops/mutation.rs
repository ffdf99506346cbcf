//! Bit-flip mutation.

use crate::core::{Chromosome, ShapeError};
use crate::ops::{chance, check_probability, OperatorError};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::instrument;

/// Perturbs a chromosome in place.
///
/// # Examples
/// ```
/// use bitga::ops::MutationOperator;
/// use bitga::{Chromosome, ShapeError};
/// use rand::SeedableRng;
///
/// struct FlipFirst;
///
/// impl MutationOperator for FlipFirst {
///     fn mutate(&self, chromosome: &mut Chromosome, _rng: &mut dyn rand::RngCore) -> Result<Option<usize>, ShapeError> {
///         chromosome.flip(0)?;
///         Ok(Some(0))
///     }
/// }
///
/// let mut chromosome: Chromosome = "0000".parse().unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// assert_eq!(FlipFirst.mutate(&mut chromosome, &mut rng).unwrap(), Some(0));
/// assert_eq!(chromosome.to_string(), "1000");
/// ```
pub trait MutationOperator: Send + Sync {
    /// Mutates `chromosome` and returns the flipped gene index, if any.
    ///
    /// # Errors
    /// Returns [`ShapeError`] when the chromosome cannot be mutated.
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<Option<usize>, ShapeError>;
}

impl<T: MutationOperator + ?Sized> MutationOperator for &T {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<Option<usize>, ShapeError> {
        (**self).mutate(chromosome, rng)
    }
}

impl<T: MutationOperator + ?Sized> MutationOperator for Box<T> {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<Option<usize>, ShapeError> {
        (**self).mutate(chromosome, rng)
    }
}

impl<T: MutationOperator + ?Sized> MutationOperator for Arc<T> {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<Option<usize>, ShapeError> {
        (**self).mutate(chromosome, rng)
    }
}

/// Flips at most one uniformly chosen bit with a given probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitFlipMutation {
    probability: u32,
}

impl BitFlipMutation {
    /// Creates the operator; `probability` is a percentage in `0..=100`.
    ///
    /// # Errors
    /// Returns [`OperatorError::InvalidProbability`] above 100.
    pub fn new(probability: u32) -> Result<Self, OperatorError> {
        check_probability("bit-flip mutation", probability)?;
        Ok(Self { probability })
    }

    /// Configured mutation percentage.
    #[must_use]
    pub fn probability(&self) -> u32 {
        self.probability
    }
}

impl MutationOperator for BitFlipMutation {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        rng: &mut dyn RngCore,
    ) -> Result<Option<usize>, ShapeError> {
        if chromosome.is_empty() || !chance(rng, self.probability) {
            return Ok(None);
        }
        let gene = rng.gen_range(0..chromosome.len());
        chromosome.flip(gene)?;
        Ok(Some(gene))
    }
}

/// Applies `operator` to every chromosome and returns how many changed.
///
/// # Errors
/// Propagates the first [`ShapeError`] raised by the operator.
#[instrument(level = "debug", skip_all, fields(chromosomes = chromosomes.len()))]
pub fn mutate_all(
    operator: &dyn MutationOperator,
    chromosomes: &mut [Chromosome],
    rng: &mut dyn RngCore,
) -> Result<usize, ShapeError> {
    let mut mutated = 0;
    for chromosome in chromosomes.iter_mut() {
        if operator.mutate(chromosome, rng)?.is_some() {
            mutated += 1;
        }
    }
    Ok(mutated)
}
