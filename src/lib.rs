#![warn(missing_docs)]

/*! Generational genetic algorithms over fixed-length binary chromosomes.

A run keeps a population of bit strings, scores each one with an
[`Objective`](ops::Objective), turns the scores into selection fitness, and
breeds the next generation through roulette-wheel selection (optionally
elitist), single-point crossover and bit-flip mutation. The default
objective maximizes the square of the normalized decoded value.

```
use bitga::{BinaryGa, RunHistory, Settings};

let mut settings = Settings::default();
settings.seed = Some(42);
settings.elitism = true;
let mut rng = settings.rng();
let mut ga = BinaryGa::new(settings).unwrap();
let mut history = RunHistory::new();
let report = ga.run(&mut rng, &mut history).unwrap();
assert_eq!(history.summaries().len(), report.generations + 1);
```
!*/

pub mod core;
pub mod ops;
pub mod report;

mod binary_ga;

pub use crate::binary_ga::{BinaryGa, BinaryGaBuilder, GaError, Phase};
pub use crate::core::experiment::{GenerationSummary, RunReport, RunStats, Statistics};
pub use crate::core::{max_value, Bit, Chromosome, Population, ShapeError, MAX_CHROMOSOME_LENGTH};
pub use crate::report::{ReportAction, Reporter, RunHistory, Silent};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Run configuration.
///
/// All fields are public; start from [`Settings::default`] and reassign what
/// you need, or load a TOML table with [`Settings::from_toml_str`]. Missing
/// keys fall back to the defaults.
///
/// ```
/// let mut settings = bitga::Settings::default();
/// settings.population_size = 20;
/// settings.elitism = true;
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of chromosomes per generation. Must be even and at most 100.
    pub population_size: usize,
    /// Number of bits per chromosome, `2..=64`.
    pub chromosome_length: usize,
    /// Chance, in percent, that a parent pair is recombined.
    pub crossover_probability: u32,
    /// Chance, in percent, that an offspring has one bit flipped.
    pub mutation_probability: u32,
    /// Number of generations bred after the initial one.
    pub generations: usize,
    /// Carry the two best chromosomes over unchanged.
    pub elitism: bool,
    /// Seed for [`Settings::rng`]; entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            population_size: 10,
            chromosome_length: 30,
            crossover_probability: 75,
            mutation_probability: 5,
            generations: 20,
            elitism: false,
            seed: None,
        }
    }
}

/// Errors raised by [`Settings::validate`] and [`Settings::from_toml_str`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The population must hold an even number of chromosomes, at least 2.
    #[error("population size must be even and at least 2 (received {0})")]
    PopulationSize(usize),
    /// The roulette wheel has 100 slots, each individual needs at least one.
    #[error("population size must not exceed 100 (received {0})")]
    PopulationTooLarge(usize),
    /// Chromosome length out of range.
    #[error("chromosome length must be within 2..=64 (received {0})")]
    ChromosomeLength(usize),
    /// A probability above 100 percent.
    #[error("{name} must be within 0..=100 percent (received {value})")]
    Probability {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: u32,
    },
    /// The TOML document could not be parsed.
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Settings {
    /// Parses settings from a TOML document and validates them.
    ///
    /// ```
    /// let settings = bitga::Settings::from_toml_str(
    ///     "population_size = 20\nelitism = true\nseed = 7",
    /// )
    /// .unwrap();
    /// assert_eq!(settings.population_size, 20);
    /// assert_eq!(settings.chromosome_length, 30);
    /// assert_eq!(settings.seed, Some(7));
    /// ```
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`] for malformed TOML and any validation
    /// error otherwise.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.population_size < 2 || self.population_size % 2 != 0 {
            return Err(SettingsError::PopulationSize(self.population_size));
        }
        if self.population_size > ops::WHEEL_SLOTS {
            return Err(SettingsError::PopulationTooLarge(self.population_size));
        }
        if !(2..=MAX_CHROMOSOME_LENGTH).contains(&self.chromosome_length) {
            return Err(SettingsError::ChromosomeLength(self.chromosome_length));
        }
        for (name, value) in [
            ("crossover probability", self.crossover_probability),
            ("mutation probability", self.mutation_probability),
        ] {
            if value > ops::PERCENT {
                return Err(SettingsError::Probability { name, value });
            }
        }
        Ok(())
    }

    /// Random number generator for a run, seeded from [`Settings::seed`].
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod settings_tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.population_size, 10);
        assert_eq!(settings.chromosome_length, 30);
        assert_eq!(settings.crossover_probability, 75);
        assert_eq!(settings.mutation_probability, 5);
        assert_eq!(settings.generations, 20);
        assert!(!settings.elitism);
    }

    #[test]
    fn odd_and_tiny_populations_are_rejected() {
        for size in [0, 1, 3, 11] {
            let settings = Settings {
                population_size: size,
                ..Settings::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(SettingsError::PopulationSize(found)) if found == size
            ));
        }
        let settings = Settings {
            population_size: 102,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PopulationTooLarge(102))
        ));
    }

    #[test]
    fn chromosome_length_bounds() {
        for (length, ok) in [(1, false), (2, true), (64, true), (65, false)] {
            let settings = Settings {
                chromosome_length: length,
                ..Settings::default()
            };
            assert_eq!(settings.validate().is_ok(), ok, "length {length}");
        }
    }

    #[test]
    fn probabilities_above_hundred_are_rejected() {
        let settings = Settings {
            mutation_probability: 101,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "mutation probability must be within 0..=100 percent (received 101)"
        );
    }

    #[test]
    fn toml_errors_are_reported() {
        assert!(matches!(
            Settings::from_toml_str("population_size = \"ten\""),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml_str("population_size = 7"),
            Err(SettingsError::PopulationSize(7))
        ));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let settings = Settings {
            seed: Some(5),
            ..Settings::default()
        };
        let a: u64 = settings.rng().gen();
        let b: u64 = settings.rng().gen();
        assert_eq!(a, b);
    }
}
