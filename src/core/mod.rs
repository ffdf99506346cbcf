//! Core binary genetic algorithm primitives.
//!
//! This module provides the chromosome codec and the population container
//! that every operator in [`crate::ops`] reads from. Chromosomes are fixed
//! length bit vectors decoded big-endian: bit `0` is the most significant bit.

pub mod experiment;

use rand::Rng;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Largest chromosome length whose decoded value fits into a `u64`.
pub const MAX_CHROMOSOME_LENGTH: usize = 64;

/// Single gene of a binary chromosome.
///
/// # Examples
/// ```
/// use bitga::Bit;
/// let bit: Bit = true;
/// assert!(bit);
/// ```
pub type Bit = bool;

/// Ordered, fixed-length collection of bits that encodes one candidate.
///
/// # Examples
/// ```
/// use bitga::Chromosome;
/// let chromosome: Chromosome = "1000".parse().unwrap();
/// assert_eq!(chromosome.decode(), 8);
/// assert_eq!(chromosome.to_string(), "1000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chromosome {
    bits: Vec<Bit>,
}

impl Chromosome {
    /// Creates a chromosome from raw bits.
    ///
    /// # Examples
    /// ```
    /// use bitga::Chromosome;
    /// let chromosome = Chromosome::new(vec![true, false]);
    /// assert_eq!(chromosome.len(), 2);
    /// ```
    #[must_use]
    pub fn new(bits: Vec<Bit>) -> Self {
        Self { bits }
    }

    /// Creates a chromosome with every bit cleared.
    #[must_use]
    pub fn zeros(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// Draws every bit independently and uniformly from `{0, 1}`.
    ///
    /// # Examples
    /// ```
    /// use bitga::Chromosome;
    /// use rand::SeedableRng;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    /// let chromosome = Chromosome::random(30, &mut rng);
    /// assert_eq!(chromosome.len(), 30);
    /// ```
    pub fn random<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Self {
        Self {
            bits: (0..length).map(|_| rng.gen::<Bit>()).collect(),
        }
    }

    /// Encodes `value` into a chromosome of `length` bits, most significant
    /// bit first.
    ///
    /// # Examples
    /// ```
    /// use bitga::Chromosome;
    /// let chromosome = Chromosome::encode(7, 4).unwrap();
    /// assert_eq!(chromosome.to_string(), "0111");
    /// ```
    ///
    /// # Errors
    /// Returns [`ShapeError::ChromosomeLength`] when `length` is zero or longer
    /// than [`MAX_CHROMOSOME_LENGTH`], and [`ShapeError::ValueOverflow`] when
    /// `value` needs more than `length` bits.
    pub fn encode(value: u64, length: usize) -> Result<Self, ShapeError> {
        check_length(length)?;
        if value > max_value(length) {
            return Err(ShapeError::ValueOverflow { value, length });
        }
        let bits = (0..length)
            .map(|idx| (value >> (length - 1 - idx)) & 1 == 1)
            .collect();
        Ok(Self { bits })
    }

    /// Decodes the chromosome into its unsigned integer value.
    ///
    /// `value = Σ bit[i] · 2^(L−1−i)`. Chromosomes are expected to hold at most
    /// [`MAX_CHROMOSOME_LENGTH`] bits, which [`Population::new`] enforces.
    ///
    /// # Examples
    /// ```
    /// use bitga::Chromosome;
    /// let chromosome = Chromosome::new(vec![true, true, true, true]);
    /// assert_eq!(chromosome.decode(), 15);
    /// ```
    #[must_use]
    pub fn decode(&self) -> u64 {
        debug_assert!(self.bits.len() <= MAX_CHROMOSOME_LENGTH);
        self.bits
            .iter()
            .fold(0_u64, |acc, &bit| (acc << 1) | u64::from(bit))
    }

    /// Returns the number of bits stored in the chromosome.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Indicates whether the chromosome has zero bits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns a shared slice with all bits.
    #[must_use]
    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    /// Returns an iterator over the bits.
    pub fn iter(&self) -> impl Iterator<Item = &Bit> {
        self.bits.iter()
    }

    /// Inverts the bit stored at `index`.
    ///
    /// # Examples
    /// ```
    /// use bitga::Chromosome;
    /// let mut chromosome: Chromosome = "0000".parse().unwrap();
    /// chromosome.flip(3).unwrap();
    /// assert_eq!(chromosome.decode(), 1);
    /// ```
    ///
    /// # Errors
    /// Returns [`ShapeError::GeneOutOfRange`] when `index` is past the end.
    pub fn flip(&mut self, index: usize) -> Result<(), ShapeError> {
        let length = self.bits.len();
        let bit = self
            .bits
            .get_mut(index)
            .ok_or(ShapeError::GeneOutOfRange { index, length })?;
        *bit = !*bit;
        Ok(())
    }

    /// Counts the positions where two chromosomes differ.
    ///
    /// # Examples
    /// ```
    /// use bitga::Chromosome;
    /// let a: Chromosome = "0110".parse().unwrap();
    /// let b: Chromosome = "0011".parse().unwrap();
    /// assert_eq!(a.hamming_distance(&b), 2);
    /// ```
    #[must_use]
    pub fn hamming_distance(&self, other: &Self) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(lhs, rhs)| lhs != rhs)
            .count()
            + self.bits.len().abs_diff(other.bits.len())
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Chromosome {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .enumerate()
            .map(|(position, character)| match character {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(ShapeError::InvalidBit {
                    position,
                    character,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bits })
    }
}

/// Returns `2^length − 1`, the largest value a chromosome of `length` bits
/// can decode to.
///
/// # Examples
/// ```
/// assert_eq!(bitga::max_value(4), 15);
/// assert_eq!(bitga::max_value(64), u64::MAX);
/// ```
#[must_use]
pub fn max_value(length: usize) -> u64 {
    if length >= MAX_CHROMOSOME_LENGTH {
        u64::MAX
    } else {
        (1_u64 << length) - 1
    }
}

/// Ordered sequence of equally sized chromosomes.
///
/// # Examples
/// ```
/// use bitga::Population;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(11);
/// let population = Population::random(10, 30, &mut rng).unwrap();
/// assert_eq!(population.len(), 10);
/// assert_eq!(population.chromosome_length(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    chromosomes: Vec<Chromosome>,
    chromosome_length: usize,
}

impl Population {
    /// Builds a population after checking that every chromosome shares the
    /// length of the first one.
    ///
    /// # Examples
    /// ```
    /// use bitga::{Chromosome, Population};
    /// let population = Population::new(vec![
    ///     "0000".parse().unwrap(),
    ///     "1111".parse().unwrap(),
    /// ])
    /// .unwrap();
    /// assert_eq!(population.decimals(), vec![0, 15]);
    /// ```
    ///
    /// # Errors
    /// Returns [`ShapeError`] when the population is empty, the chromosome
    /// length is unsupported, or lengths disagree.
    pub fn new(chromosomes: Vec<Chromosome>) -> Result<Self, ShapeError> {
        let chromosome_length = chromosomes
            .first()
            .map(Chromosome::len)
            .ok_or(ShapeError::EmptyPopulation)?;
        check_length(chromosome_length)?;
        for (index, chromosome) in chromosomes.iter().enumerate() {
            if chromosome.len() != chromosome_length {
                return Err(ShapeError::LengthMismatch {
                    index,
                    expected: chromosome_length,
                    found: chromosome.len(),
                });
            }
        }
        Ok(Self {
            chromosomes,
            chromosome_length,
        })
    }

    /// Generates `size` random chromosomes of `length` bits.
    ///
    /// # Errors
    /// Returns [`ShapeError`] when `size` is zero or `length` is unsupported.
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        length: usize,
        rng: &mut R,
    ) -> Result<Self, ShapeError> {
        if size == 0 {
            return Err(ShapeError::EmptyPopulation);
        }
        check_length(length)?;
        let chromosomes = (0..size)
            .map(|_| Chromosome::random(length, rng))
            .collect();
        Ok(Self {
            chromosomes,
            chromosome_length: length,
        })
    }

    /// Returns the number of chromosomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    /// Always `false`; populations are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Returns the shared chromosome length.
    #[must_use]
    pub fn chromosome_length(&self) -> usize {
        self.chromosome_length
    }

    /// Returns the chromosomes in population order.
    #[must_use]
    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Returns the chromosome at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Chromosome> {
        self.chromosomes.get(index)
    }

    /// Returns an iterator over the chromosomes.
    pub fn iter(&self) -> impl Iterator<Item = &Chromosome> {
        self.chromosomes.iter()
    }

    /// Decodes every chromosome.
    #[must_use]
    pub fn decimals(&self) -> Vec<u64> {
        self.chromosomes.iter().map(Chromosome::decode).collect()
    }

    /// Checks that the population holds exactly `size` chromosomes.
    ///
    /// # Errors
    /// Returns [`ShapeError::SizeMismatch`] otherwise.
    pub fn ensure_size(&self, size: usize) -> Result<(), ShapeError> {
        if self.chromosomes.len() != size {
            return Err(ShapeError::SizeMismatch {
                expected: size,
                found: self.chromosomes.len(),
            });
        }
        Ok(())
    }
}

/// Error returned when chromosomes or populations have the wrong shape.
///
/// # Examples
/// ```
/// use bitga::{Chromosome, ShapeError};
/// let err = "01x".parse::<Chromosome>().unwrap_err();
/// assert!(matches!(err, ShapeError::InvalidBit { position: 2, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// A population must hold at least one chromosome.
    #[error("population must contain at least one chromosome")]
    EmptyPopulation,
    /// A population holds a different number of chromosomes than required.
    #[error("population holds {found} chromosomes but {expected} are required")]
    SizeMismatch {
        /// Required population size.
        expected: usize,
        /// Actual population size.
        found: usize,
    },
    /// A chromosome is shorter or longer than its population siblings.
    #[error("chromosome {index} has {found} bits but {expected} are required")]
    LengthMismatch {
        /// Position of the offending chromosome.
        index: usize,
        /// Required chromosome length.
        expected: usize,
        /// Actual chromosome length.
        found: usize,
    },
    /// The chromosome length is zero or cannot be decoded into a `u64`.
    #[error("chromosome length must be within 1..=64 (received {length})")]
    ChromosomeLength {
        /// The rejected length.
        length: usize,
    },
    /// A value does not fit into the requested number of bits.
    #[error("value {value} does not fit into {length} bits")]
    ValueOverflow {
        /// The value to encode.
        value: u64,
        /// The requested chromosome length.
        length: usize,
    },
    /// A gene index is past the end of the chromosome.
    #[error("gene index {index} is out of range for a chromosome of {length} bits")]
    GeneOutOfRange {
        /// The requested gene index.
        index: usize,
        /// The chromosome length.
        length: usize,
    },
    /// A bit string contains something other than `0` or `1`.
    #[error("invalid bit {character:?} at position {position}")]
    InvalidBit {
        /// Position of the offending character.
        position: usize,
        /// The offending character.
        character: char,
    },
}

fn check_length(length: usize) -> Result<(), ShapeError> {
    if length == 0 || length > MAX_CHROMOSOME_LENGTH {
        return Err(ShapeError::ChromosomeLength { length });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn decode_is_big_endian() {
        let chromosome: Chromosome = "0111".parse().unwrap();
        assert_eq!(chromosome.decode(), 7);
        let chromosome: Chromosome = "1000".parse().unwrap();
        assert_eq!(chromosome.decode(), 8);
    }

    #[test]
    fn decode_handles_full_width() {
        let chromosome = Chromosome::new(vec![true; 64]);
        assert_eq!(chromosome.decode(), u64::MAX);
        assert_eq!(max_value(30), (1 << 30) - 1);
    }

    #[test]
    fn encode_rejects_overflowing_values() {
        let err = Chromosome::encode(16, 4).unwrap_err();
        assert_eq!(err, ShapeError::ValueOverflow { value: 16, length: 4 });
    }

    #[test]
    fn random_population_has_requested_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let population = Population::random(10, 30, &mut rng).unwrap();
        assert_eq!(population.len(), 10);
        assert!(population.iter().all(|chromosome| chromosome.len() == 30));
        assert!(population.ensure_size(10).is_ok());
        assert!(population.ensure_size(8).is_err());
    }

    #[test]
    fn random_bits_are_roughly_balanced() {
        let mut rng = StdRng::seed_from_u64(17);
        let chromosome = Chromosome::random(10_000, &mut rng);
        let ones = chromosome.iter().filter(|bit| **bit).count();
        assert!((4_700..=5_300).contains(&ones), "ones = {ones}");
    }

    #[test]
    fn population_rejects_ragged_chromosomes() {
        let err = Population::new(vec![Chromosome::zeros(4), Chromosome::zeros(3)]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::LengthMismatch {
                index: 1,
                expected: 4,
                found: 3
            }
        );
        assert_eq!(
            Population::new(vec![]).unwrap_err(),
            ShapeError::EmptyPopulation
        );
        assert!(Population::new(vec![Chromosome::zeros(65)]).is_err());
    }

    #[test]
    fn flip_out_of_range_fails() {
        let mut chromosome = Chromosome::zeros(4);
        assert!(chromosome.flip(4).is_err());
        chromosome.flip(0).unwrap();
        assert_eq!(chromosome.to_string(), "1000");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(length in 1_usize..=64, raw in any::<u64>()) {
            let value = raw & max_value(length);
            let chromosome = Chromosome::encode(value, length).unwrap();
            prop_assert_eq!(chromosome.len(), length);
            prop_assert_eq!(chromosome.decode(), value);
        }

        #[test]
        fn encode_inverts_decode(bits in proptest::collection::vec(any::<bool>(), 1..=64)) {
            let chromosome = Chromosome::new(bits);
            let encoded = Chromosome::encode(chromosome.decode(), chromosome.len()).unwrap();
            prop_assert_eq!(encoded, chromosome);
        }
    }
}
