//! Genetic operators for binary chromosomes.
//!
//! Each sub-module covers one stage of a generation: objective evaluation,
//! fitness normalisation, roulette-wheel selection, single-point crossover and
//! bit-flip mutation. The stages are pure transformations; the driver in
//! [`crate::BinaryGa`] threads their outputs from one stage into the next.

pub mod crossover;
pub mod fitness;
pub mod mutation;
pub mod objective;
pub mod selection;

pub use crossover::{recombine, single_point, CrossoverOperator, SinglePointCrossover};
pub use fitness::{normalize, Normalized};
pub use mutation::{mutate_all, BitFlipMutation, MutationOperator};
pub use objective::{evaluate, round_objective, Evaluation, NormalizedSquare, Objective};
pub use selection::{
    RouletteWheelSelection, Selection, SelectionError, SelectionOperator, Wheel, WHEEL_SLOTS,
};

use crate::core::ShapeError;
use rand::{Rng, RngCore};

/// Upper bound of every operator probability, expressed in percent.
pub const PERCENT: u32 = 100;

/// Errors produced while configuring or applying operators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorError {
    /// A probability was outside `0..=100`.
    #[error("{operator} probability must be within 0..=100 percent (received {value})")]
    InvalidProbability {
        /// Name of the operator reporting the error.
        operator: &'static str,
        /// Offending value.
        value: u32,
    },
    /// A selection referenced an individual that does not exist.
    #[error("parent index {index} is out of range for a population of {population_size}")]
    UnknownParent {
        /// Offending index.
        index: usize,
        /// Size of the population.
        population_size: usize,
    },
    /// Crossover positions come in pairs; one was left over.
    #[error("position {position} has no crossover partner")]
    UnpairedParent {
        /// The unpaired output position.
        position: usize,
    },
    /// Wrapper around [`ShapeError`].
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Rolls an integer in `0..100` and reports whether it fell below `percent`.
pub(crate) fn chance(rng: &mut dyn RngCore, percent: u32) -> bool {
    rng.gen_range(0..PERCENT) < percent
}

pub(crate) fn check_probability(operator: &'static str, value: u32) -> Result<(), OperatorError> {
    if value > PERCENT {
        return Err(OperatorError::InvalidProbability { operator, value });
    }
    Ok(())
}
