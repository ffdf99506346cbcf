//! Roulette-wheel parent selection with optional elitism.
//!
//! Fitness values are discretised onto a wheel of [`WHEEL_SLOTS`] slots. Each
//! individual owns `floor(fitness × 100)` contiguous slots (at least one), the
//! largest holder absorbs whatever rounding left over or took too much, and
//! parents are drawn by picking slots uniformly.

use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::instrument;

/// Number of slots on the roulette wheel.
pub const WHEEL_SLOTS: usize = 100;

/// Parent indices chosen for the next generation.
///
/// When [`Self::elites`] is set, `parents[0]` and `parents[1]` are the elite
/// indices and the remaining positions were drawn from the wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// One parent index per output position.
    pub parents: Vec<usize>,
    /// Indices of the best and second-best individuals when elitism is on.
    pub elites: Option<[usize; 2]>,
}

impl Selection {
    /// Number of leading output positions reserved for elites.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        if self.elites.is_some() {
            2
        } else {
            0
        }
    }
}

/// Errors raised while building the wheel or drawing parents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// There is nothing to select from.
    #[error("cannot select parents from an empty population")]
    EmptyPopulation,
    /// Every individual needs at least one wheel slot.
    #[error("{size} individuals do not fit on a 100-slot wheel")]
    TooManyIndividuals {
        /// Population size.
        size: usize,
    },
    /// Elitism keeps two individuals and needs at least two to choose from.
    #[error("elitism needs at least two individuals (received {size})")]
    TooFewForElitism {
        /// Population size.
        size: usize,
    },
    /// Internal invariant failure: the adjusted wheel does not hold exactly
    /// [`WHEEL_SLOTS`] slots.
    #[error("wheel holds {total} slots after normalisation instead of 100")]
    WheelInvariant {
        /// Slot total after adjustment.
        total: usize,
    },
}

/// Chooses parents for the next generation from fitness values.
///
/// # Examples
/// ```
/// use bitga::ops::{Selection, SelectionError, SelectionOperator};
/// use rand::SeedableRng;
///
/// struct FirstOnly;
///
/// impl SelectionOperator for FirstOnly {
///     fn select(&self, fitness: &[f64], _rng: &mut dyn rand::RngCore) -> Result<Selection, SelectionError> {
///         Ok(Selection { parents: vec![0; fitness.len()], elites: None })
///     }
/// }
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let selection = FirstOnly.select(&[0.5, 0.5], &mut rng).unwrap();
/// assert_eq!(selection.parents, vec![0, 0]);
/// ```
pub trait SelectionOperator: Send + Sync {
    /// Returns one parent index per individual in `fitness`.
    ///
    /// # Errors
    /// Returns [`SelectionError`] when no valid selection can be made.
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore)
        -> Result<Selection, SelectionError>;
}

impl<T: SelectionOperator + ?Sized> SelectionOperator for &T {
    fn select(
        &self,
        fitness: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection, SelectionError> {
        (**self).select(fitness, rng)
    }
}

impl<T: SelectionOperator + ?Sized> SelectionOperator for Box<T> {
    fn select(
        &self,
        fitness: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection, SelectionError> {
        (**self).select(fitness, rng)
    }
}

impl<T: SelectionOperator + ?Sized> SelectionOperator for Arc<T> {
    fn select(
        &self,
        fitness: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection, SelectionError> {
        (**self).select(fitness, rng)
    }
}

/// Discretised roulette wheel.
///
/// # Examples
/// ```
/// use bitga::ops::{Wheel, WHEEL_SLOTS};
///
/// let wheel = Wheel::build(&[0.0, 0.6657, 0.1893, 0.1450]).unwrap();
/// assert_eq!(wheel.counts(), &[1, 67, 18, 14]);
/// assert_eq!(wheel.slots().len(), WHEEL_SLOTS);
/// assert_eq!(wheel.elites(), [1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wheel {
    counts: Vec<usize>,
    slots: Vec<usize>,
}

impl Wheel {
    /// Scales fitness to slot counts, normalises them to [`WHEEL_SLOTS`] and
    /// lays the slots out contiguously in population order.
    ///
    /// # Errors
    /// Returns [`SelectionError`] for an empty or oversized population, or
    /// [`SelectionError::WheelInvariant`] if normalisation breaks down.
    #[instrument(level = "debug", skip_all, fields(population_size = fitness.len()))]
    pub fn build(fitness: &[f64]) -> Result<Self, SelectionError> {
        if fitness.is_empty() {
            return Err(SelectionError::EmptyPopulation);
        }
        if fitness.len() > WHEEL_SLOTS {
            return Err(SelectionError::TooManyIndividuals {
                size: fitness.len(),
            });
        }

        let mut counts: Vec<usize> = fitness.iter().map(|value| slot_count(*value)).collect();
        let mut largest = 0;
        for (idx, &count) in counts.iter().enumerate() {
            if count > counts[largest] {
                largest = idx;
            }
        }

        let total: usize = counts.iter().sum();
        if total < WHEEL_SLOTS {
            counts[largest] += WHEEL_SLOTS - total;
        } else if total > WHEEL_SLOTS {
            trim_excess(&mut counts, largest, total - WHEEL_SLOTS);
        }

        let total: usize = counts.iter().sum();
        if total != WHEEL_SLOTS {
            return Err(SelectionError::WheelInvariant { total });
        }

        let mut slots = Vec::with_capacity(WHEEL_SLOTS);
        for (idx, &count) in counts.iter().enumerate() {
            slots.extend(std::iter::repeat(idx).take(count));
        }
        Ok(Self { counts, slots })
    }

    /// Slot count per individual.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Individual index stored in each slot.
    #[must_use]
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Draws a slot uniformly and returns the individual that owns it.
    pub fn spin(&self, rng: &mut dyn RngCore) -> usize {
        self.slots[rng.gen_range(0..WHEEL_SLOTS)]
    }

    /// Returns the holders of the largest and second-largest slot counts.
    ///
    /// The scan replaces the leader on `>=` but the runner-up only on `>`, so
    /// among equal leaders the last one seen ranks first and the previous
    /// leader drops to second.
    ///
    /// Ranking uses floored slot counts, not raw fitness. Two individuals
    /// whose fitness floors to the same count tie, and the tie-break can then
    /// keep the weaker one as runner-up: fitness `[0.159, 0.155, 0.686, 0.0]`
    /// gives counts `[15, 15, 69, 1]` and elites `[2, 1]`, dropping index 0.
    #[must_use]
    pub fn elites(&self) -> [usize; 2] {
        let (mut best, mut second) = (0, 0);
        let (mut best_count, mut second_count) = (0, 0);
        for (idx, &count) in self.counts.iter().enumerate() {
            if count >= best_count {
                second_count = best_count;
                second = best;
                best_count = count;
                best = idx;
            } else if count > second_count {
                second_count = count;
                second = idx;
            }
        }
        [best, second]
    }
}

/// Fitness-proportionate selection over a [`Wheel`].
///
/// # Examples
/// ```
/// use bitga::ops::{RouletteWheelSelection, SelectionOperator};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(9);
/// let selection = RouletteWheelSelection::elitist()
///     .select(&[0.0, 0.6657, 0.1893, 0.1450], &mut rng)
///     .unwrap();
/// assert_eq!(selection.elites, Some([1, 2]));
/// assert_eq!(&selection.parents[..2], &[1, 2]);
/// assert_eq!(selection.parents.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouletteWheelSelection {
    elitism: bool,
}

impl RouletteWheelSelection {
    /// Creates a selector, keeping the two best individuals when `elitism` is set.
    #[must_use]
    pub fn new(elitism: bool) -> Self {
        Self { elitism }
    }

    /// Selector that draws every parent from the wheel.
    #[must_use]
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Selector that reserves the first two positions for the elites.
    #[must_use]
    pub fn elitist() -> Self {
        Self::new(true)
    }

    /// Whether elites are carried over.
    #[must_use]
    pub fn elitism(&self) -> bool {
        self.elitism
    }
}

impl SelectionOperator for RouletteWheelSelection {
    #[instrument(level = "debug", skip_all, fields(population_size = fitness.len(), elitism = self.elitism))]
    fn select(
        &self,
        fitness: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection, SelectionError> {
        if self.elitism && fitness.len() < 2 {
            return Err(SelectionError::TooFewForElitism {
                size: fitness.len(),
            });
        }
        let wheel = Wheel::build(fitness)?;
        let mut parents = Vec::with_capacity(fitness.len());
        let elites = if self.elitism {
            let elites = wheel.elites();
            parents.extend_from_slice(&elites);
            Some(elites)
        } else {
            None
        };
        while parents.len() < fitness.len() {
            parents.push(wheel.spin(rng));
        }
        Ok(Selection { parents, elites })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn slot_count(fitness: f64) -> usize {
    let count = (fitness * WHEEL_SLOTS as f64).floor() as usize;
    count.max(1)
}

/// Removes `excess` slots, starting with the largest holder and moving on to
/// the next-largest ones, never leaving anyone with fewer than one slot.
fn trim_excess(counts: &mut [usize], largest: usize, mut excess: usize) {
    let taken = excess.min(counts[largest] - 1);
    counts[largest] -= taken;
    excess -= taken;
    if excess == 0 {
        return;
    }

    tracing::warn!(
        excess,
        holder = largest,
        "largest wheel holder cannot absorb the excess, spreading it"
    );
    let mut order: Vec<usize> = (0..counts.len()).filter(|&idx| idx != largest).collect();
    order.sort_by(|&lhs, &rhs| counts[rhs].cmp(&counts[lhs]));
    for idx in order {
        if excess == 0 {
            break;
        }
        let taken = excess.min(counts[idx] - 1);
        counts[idx] -= taken;
        excess -= taken;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shortfall_goes_to_the_largest_holder() {
        let wheel = Wheel::build(&[0.0, 0.6657, 0.1893, 0.1450]).unwrap();
        assert_eq!(wheel.counts(), &[1, 67, 18, 14]);
    }

    #[test]
    fn slots_are_contiguous_in_population_order() {
        let wheel = Wheel::build(&[0.25, 0.5, 0.25]).unwrap();
        assert_eq!(wheel.counts(), &[25, 50, 25]);
        assert!(wheel.slots()[..25].iter().all(|&idx| idx == 0));
        assert!(wheel.slots()[25..75].iter().all(|&idx| idx == 1));
        assert!(wheel.slots()[75..].iter().all(|&idx| idx == 2));
    }

    #[test]
    fn first_largest_holder_wins_ties() {
        // 33 + 33 + 33 = 99, the first 33 gets the missing slot.
        let wheel = Wheel::build(&[1.0 / 3.0; 3]).unwrap();
        assert_eq!(wheel.counts(), &[34, 33, 33]);
    }

    #[test]
    fn excess_is_taken_from_the_largest_holder() {
        // Four zeros forced to one slot each push the total to 104.
        let wheel = Wheel::build(&[0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(wheel.counts(), &[1, 1, 1, 1, 96]);
    }

    #[test]
    fn excess_spreads_when_the_largest_holder_runs_dry() {
        let mut fitness = vec![0.0; 100];
        fitness[0] = 0.02;
        fitness[1] = 0.98 / 2.0;
        fitness[2] = 0.98 / 2.0;
        let wheel = Wheel::build(&fitness).unwrap();
        assert_eq!(wheel.slots().len(), WHEEL_SLOTS);
        assert!(wheel.counts().iter().all(|&count| count == 1));
    }

    #[test]
    fn oversized_population_is_rejected() {
        let err = Wheel::build(&[0.0; 101]).unwrap_err();
        assert_eq!(err, SelectionError::TooManyIndividuals { size: 101 });
    }

    #[test]
    fn elite_tie_break_prefers_the_last_equal_leader() {
        let wheel = Wheel::build(&[0.3, 0.3, 0.2, 0.2]).unwrap();
        assert_eq!(wheel.counts(), &[30, 30, 20, 20]);
        assert_eq!(wheel.elites(), [1, 0]);
    }

    #[test]
    fn elite_runner_up_keeps_the_first_of_equal_counts() {
        let wheel = Wheel::build(&[0.2, 0.2, 0.6]).unwrap();
        assert_eq!(wheel.counts(), &[20, 20, 60]);
        // Index 1 ties index 0 for the lead at the time it is scanned.
        assert_eq!(wheel.elites(), [2, 1]);
    }

    #[test]
    fn elites_rank_by_slot_count_not_raw_fitness() {
        let fitness = [0.159, 0.155, 0.686, 0.0];
        let wheel = Wheel::build(&fitness).unwrap();
        assert_eq!(wheel.counts(), &[15, 15, 69, 1]);
        let elites = wheel.elites();
        assert_eq!(elites, [2, 1]);
        // Index 0 is fitter than the runner-up but shares its floored count.
        assert!(fitness[0] > fitness[elites[1]]);
        assert!(!elites.contains(&0));
    }

    #[test]
    fn plain_selection_draws_every_position() {
        let mut rng = StdRng::seed_from_u64(21);
        let selection = RouletteWheelSelection::plain()
            .select(&[0.1, 0.2, 0.3, 0.4], &mut rng)
            .unwrap();
        assert_eq!(selection.parents.len(), 4);
        assert!(selection.elites.is_none());
        assert_eq!(selection.elite_count(), 0);
        assert!(selection.parents.iter().all(|&idx| idx < 4));
        assert!(!RouletteWheelSelection::plain().elitism());
        assert!(RouletteWheelSelection::elitist().elitism());
    }

    #[test]
    fn draws_follow_slot_proportions() {
        let wheel = Wheel::build(&[0.1, 0.3, 0.6]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut counts = [0_usize; 3];
        for _ in 0..10_000 {
            counts[wheel.spin(&mut rng)] += 1;
        }
        let expected = [0.1, 0.3, 0.6];
        for (count, expected) in counts.iter().zip(expected) {
            #[allow(clippy::cast_precision_loss)]
            let share = *count as f64 / 10_000.0;
            assert!((share - expected).abs() < 0.03, "{share} vs {expected}");
        }
    }

    #[test]
    fn elitism_requires_two_individuals() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = RouletteWheelSelection::elitist()
            .select(&[1.0], &mut rng)
            .unwrap_err();
        assert_eq!(err, SelectionError::TooFewForElitism { size: 1 });
    }

    proptest! {
        #[test]
        fn wheel_always_holds_every_individual(raw in proptest::collection::vec(0.0_f64..=1.0, 2..=100)) {
            let total: f64 = raw.iter().sum();
            prop_assume!(total > 0.0);
            let fitness: Vec<f64> = raw.iter().map(|value| value / total).collect();
            let wheel = Wheel::build(&fitness).unwrap();
            prop_assert_eq!(wheel.slots().len(), WHEEL_SLOTS);
            prop_assert_eq!(wheel.counts().iter().sum::<usize>(), WHEEL_SLOTS);
            for idx in 0..fitness.len() {
                prop_assert!(wheel.slots().contains(&idx));
            }
        }

        #[test]
        fn elites_hold_the_most_slots(raw in proptest::collection::vec(0.01_f64..=1.0, 2..=20)) {
            let total: f64 = raw.iter().sum();
            let fitness: Vec<f64> = raw.iter().map(|value| value / total).collect();
            let wheel = Wheel::build(&fitness).unwrap();
            let [best, second] = wheel.elites();
            prop_assert_ne!(best, second);
            let counts = wheel.counts();
            for (idx, &count) in counts.iter().enumerate() {
                if idx != best && idx != second {
                    prop_assert!(counts[best] >= count);
                    prop_assert!(counts[second] >= count);
                }
            }
        }
    }
}
