//! Father selection for a reproducing female.
//!
//! A female in a relationship keeps her mate with probability `fidelity`;
//! otherwise she picks another living male of mating age uniformly at
//! random. A single female picks uniformly among living males, accepting a
//! mated male only with probability `1 - fidelity`.
//!
//! Every rejection-sampling loop is preceded by a check that some candidate
//! can be accepted, so selection always terminates.

use pedigree_types::{MatingWindows, PersonId};
use rand::Rng;

use crate::population::LivingEntry;
use crate::registry::Registry;

/// Everything mate selection reads at the moment of a reproduction event.
#[derive(Debug, Clone, Copy)]
pub struct MatingContext<'a> {
    /// All person records.
    pub registry: &'a Registry,
    /// Living males, sampled uniformly by position.
    pub males: &'a [LivingEntry],
    /// Mating age windows.
    pub windows: &'a MatingWindows,
    /// Probability of staying with (or respecting) an existing mate.
    pub fidelity: f64,
    /// Current clock time.
    pub time: f64,
}

impl MatingContext<'_> {
    /// Choose a father for `female`, or `None` if no acceptable male exists.
    pub fn select_father<R: Rng + ?Sized>(&self, female: PersonId, rng: &mut R) -> Option<PersonId> {
        if self.males.is_empty() {
            return None;
        }

        if let Some(mate) = self.registry.current_mate(female, self.time) {
            if rng.random::<f64>() < self.fidelity {
                return Some(mate);
            }
            return self.select_other_than(mate, rng);
        }

        self.select_respecting_relationships(rng)
    }

    /// Uniformly pick a living male of mating age other than `excluded`.
    fn select_other_than<R: Rng + ?Sized>(&self, excluded: PersonId, rng: &mut R) -> Option<PersonId> {
        let exists = self
            .males
            .iter()
            .any(|entry| entry.id != excluded && self.is_mating_age(entry.id));
        if !exists {
            return None;
        }
        loop {
            let candidate = self.random_male(rng)?;
            if candidate != excluded && self.is_mating_age(candidate) {
                return Some(candidate);
            }
        }
    }

    /// Uniformly pick a living male, accepting a mated one only with
    /// probability `1 - fidelity`.
    fn select_respecting_relationships<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PersonId> {
        let all_mated = self
            .males
            .iter()
            .all(|entry| self.registry.is_in_relationship(entry.id, self.time));
        if all_mated && self.fidelity >= 1.0 {
            return None;
        }
        loop {
            let candidate = self.random_male(rng)?;
            if !self.registry.is_in_relationship(candidate, self.time) {
                return Some(candidate);
            }
            if rng.random::<f64>() >= self.fidelity {
                return Some(candidate);
            }
        }
    }

    fn random_male<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PersonId> {
        if self.males.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.males.len());
        self.males.get(index).map(|entry| entry.id)
    }

    fn is_mating_age(&self, id: PersonId) -> bool {
        self.registry
            .get(id)
            .is_some_and(|person| person.is_mating_age(self.time, self.windows))
    }
}
