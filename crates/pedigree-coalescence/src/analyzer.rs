//! Backward traversal of ancestral lines.
//!
//! Active ancestors sit in a max-heap ordered by birth time, so the most
//! recently born line is always stepped back first. Because a parent is born
//! strictly before any of its children, every line that could reach a given
//! ancestor has done so before that ancestor leaves the heap.

use std::collections::HashSet;

use pedigree_queue::{PriorityQueue, QueueError};
use pedigree_types::{Ancestor, AncestorSource, CoalescencePoint, PersonId};
use serde::Serialize;
use tracing::debug;

use crate::error::CoalescenceError;

/// Heap arity used when none is configured.
const DEFAULT_ARITY: usize = 2;

/// Coalescence sequences for both sexes of one final population.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lineages {
    /// Lines traced from living males through fathers.
    pub paternal: Vec<CoalescencePoint>,
    /// Lines traced from living females through mothers.
    pub maternal: Vec<CoalescencePoint>,
}

/// Computes coalescence points over ancestor snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescenceAnalyzer {
    arity: usize,
}

impl Default for CoalescenceAnalyzer {
    fn default() -> Self {
        Self {
            arity: DEFAULT_ARITY,
        }
    }
}

impl CoalescenceAnalyzer {
    /// Create an analyzer whose ancestor heap has the given arity.
    ///
    /// # Errors
    ///
    /// Returns [`CoalescenceError::Queue`] if `arity < 2`.
    pub fn new(arity: usize) -> Result<Self, CoalescenceError> {
        if arity < DEFAULT_ARITY {
            return Err(QueueError::InvalidArity { arity }.into());
        }
        Ok(Self { arity })
    }

    /// Arity of the ancestor heap.
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Trace every member of `population` back to the founders.
    ///
    /// The result lists `(birth time of the younger line, lines remaining)`
    /// for each merge, most recent first, and always ends with
    /// `(0, lines remaining)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoalescenceError::MissingAncestor`] if a parent id cannot be
    /// resolved through `source`.
    pub fn analyze<S>(
        &self,
        population: &[Ancestor],
        source: &S,
    ) -> Result<Vec<CoalescencePoint>, CoalescenceError>
    where
        S: AncestorSource + ?Sized,
    {
        let mut heap = PriorityQueue::max(self.arity, Ancestor::by_birth_time)?;
        heap.heapify_from_array(population.to_vec());
        let mut active: HashSet<PersonId> = population.iter().map(|a| a.id).collect();
        let mut lines = active.len();
        let mut points = Vec::new();

        while !heap.is_empty() {
            let youngest = heap.extract_root()?;
            active.remove(&youngest.id);

            let Some(parent_id) = youngest.lineage_parent() else {
                continue;
            };
            if active.contains(&parent_id) {
                lines = lines.saturating_sub(1);
                points.push(CoalescencePoint {
                    time: youngest.birth_time,
                    lines,
                });
            } else {
                let parent = source
                    .ancestor(parent_id)
                    .ok_or(CoalescenceError::MissingAncestor { id: parent_id })?;
                active.insert(parent_id);
                heap.insert(parent);
            }
        }

        points.push(CoalescencePoint { time: 0.0, lines });
        debug!(
            population = population.len(),
            merges = points.len().saturating_sub(1),
            remaining_lines = lines,
            "Coalescence complete"
        );
        Ok(points)
    }

    /// Analyze the paternal lines of `males` and the maternal lines of
    /// `females` independently.
    ///
    /// # Errors
    ///
    /// See [`analyze`](Self::analyze).
    pub fn analyze_lineages<S>(
        &self,
        males: &[Ancestor],
        females: &[Ancestor],
        source: &S,
    ) -> Result<Lineages, CoalescenceError>
    where
        S: AncestorSource + ?Sized,
    {
        Ok(Lineages {
            paternal: self.analyze(males, source)?,
            maternal: self.analyze(females, source)?,
        })
    }
}

/// [`CoalescenceAnalyzer::analyze`] with the default binary heap.
///
/// # Errors
///
/// See [`CoalescenceAnalyzer::analyze`].
pub fn analyze<S>(
    population: &[Ancestor],
    source: &S,
) -> Result<Vec<CoalescencePoint>, CoalescenceError>
where
    S: AncestorSource + ?Sized,
{
    CoalescenceAnalyzer::default().analyze(population, source)
}

/// [`CoalescenceAnalyzer::analyze_lineages`] with the default binary heap.
///
/// # Errors
///
/// See [`CoalescenceAnalyzer::analyze`].
pub fn analyze_lineages<S>(
    males: &[Ancestor],
    females: &[Ancestor],
    source: &S,
) -> Result<Lineages, CoalescenceError>
where
    S: AncestorSource + ?Sized,
{
    CoalescenceAnalyzer::default().analyze_lineages(males, females, source)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use pedigree_types::Sex;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    /// A small hand-built genealogy.
    #[derive(Default)]
    struct Pedigree {
        people: BTreeMap<PersonId, Ancestor>,
    }

    impl Pedigree {
        fn founder(&mut self, id: u64, sex: Sex) -> Ancestor {
            self.add(id, sex, 0.0, None, None)
        }

        fn son(&mut self, id: u64, birth: f64, father: u64) -> Ancestor {
            self.add(id, Sex::Male, birth, Some(99), Some(father))
        }

        fn daughter(&mut self, id: u64, birth: f64, mother: u64) -> Ancestor {
            self.add(id, Sex::Female, birth, Some(mother), Some(98))
        }

        fn add(
            &mut self,
            id: u64,
            sex: Sex,
            birth_time: f64,
            mother: Option<u64>,
            father: Option<u64>,
        ) -> Ancestor {
            let ancestor = Ancestor {
                id: PersonId::new(id),
                sex,
                birth_time,
                death_time: birth_time + 70.0,
                mother: mother.map(PersonId::new),
                father: father.map(PersonId::new),
            };
            self.people.insert(ancestor.id, ancestor);
            ancestor
        }
    }

    fn point(time: f64, lines: usize) -> CoalescencePoint {
        CoalescencePoint { time, lines }
    }

    #[test]
    fn rejects_invalid_arity() {
        assert!(CoalescenceAnalyzer::new(1).is_err());
        assert_eq!(CoalescenceAnalyzer::new(4).unwrap().arity(), 4);
    }

    #[test]
    fn empty_population_has_no_lines() {
        let source: BTreeMap<PersonId, Ancestor> = BTreeMap::new();
        let points = analyze(&[], &source).unwrap();
        assert_eq!(points, vec![point(0.0, 0)]);
    }

    #[test]
    fn founders_never_merge() {
        let mut pedigree = Pedigree::default();
        let men: Vec<Ancestor> = (0..3).map(|id| pedigree.founder(id, Sex::Male)).collect();
        let points = analyze(&men, &pedigree.people).unwrap();
        assert_eq!(points, vec![point(0.0, 3)]);
    }

    #[test]
    fn brothers_merge_at_the_younger_birth() {
        let mut pedigree = Pedigree::default();
        pedigree.founder(0, Sex::Male);
        let a = pedigree.son(1, 20.0, 0);
        let b = pedigree.son(2, 25.0, 0);
        let points = analyze(&[a, b], &pedigree.people).unwrap();
        assert_eq!(points, vec![point(20.0, 1), point(0.0, 1)]);
    }

    #[test]
    fn merges_are_recorded_most_recent_first() {
        let mut pedigree = Pedigree::default();
        pedigree.founder(0, Sex::Male);
        pedigree.son(1, 20.0, 0);
        pedigree.son(2, 30.0, 0);
        let s1 = pedigree.son(3, 50.0, 1);
        let s2 = pedigree.son(4, 55.0, 1);
        let s3 = pedigree.son(5, 60.0, 2);

        let points = analyze(&[s1, s2, s3], &pedigree.people).unwrap();
        assert_eq!(points, vec![point(50.0, 2), point(20.0, 1), point(0.0, 1)]);
    }

    #[test]
    fn maternal_lines_follow_mothers_only() {
        let mut pedigree = Pedigree::default();
        pedigree.founder(10, Sex::Female);
        pedigree.founder(11, Sex::Female);
        let d1 = pedigree.daughter(12, 30.0, 10);
        let d2 = pedigree.daughter(13, 35.0, 11);
        // Sisters share a father (98) but not a mother.
        let points = analyze(&[d1, d2], &pedigree.people).unwrap();
        assert_eq!(points, vec![point(0.0, 2)]);
    }

    #[test]
    fn unknown_parent_is_reported() {
        let mut pedigree = Pedigree::default();
        let orphan = pedigree.son(1, 20.0, 42);
        let result = analyze(&[orphan], &pedigree.people);
        assert!(matches!(
            result,
            Err(CoalescenceError::MissingAncestor { id }) if id == PersonId::new(42)
        ));
    }

    #[test]
    fn lineages_analyze_each_sex_independently() {
        let mut pedigree = Pedigree::default();
        pedigree.founder(0, Sex::Male);
        pedigree.founder(1, Sex::Female);
        let a = pedigree.son(2, 20.0, 0);
        let b = pedigree.son(3, 22.0, 0);
        let c = pedigree.daughter(4, 21.0, 1);

        let lineages = analyze_lineages(&[a, b], &[c], &pedigree.people).unwrap();
        assert_eq!(lineages.paternal, analyze(&[a, b], &pedigree.people).unwrap());
        assert_eq!(lineages.maternal, vec![point(0.0, 1)]);
    }

    #[test]
    fn line_counts_only_decrease_toward_time_zero() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pedigree = Pedigree::default();
        for id in 0..10 {
            pedigree.founder(id, Sex::Male);
        }
        for id in 10_u64..300 {
            let father = rng.random_range(0..id);
            let parent = pedigree.people.get(&PersonId::new(father)).unwrap();
            let birth = parent.birth_time + rng.random_range(16.0..40.0);
            pedigree.son(id, birth, father);
        }
        let population: Vec<Ancestor> = pedigree.people.values().rev().take(60).copied().collect();

        for arity in 2..=5 {
            let points = CoalescenceAnalyzer::new(arity)
                .unwrap()
                .analyze(&population, &pedigree.people)
                .unwrap();
            let last = points.last().copied().unwrap();
            assert_eq!(last.time, 0.0);
            assert!(last.lines >= 1);

            let mut previous = population.len();
            for window in points.windows(2) {
                if let [newer, older] = window {
                    assert!(newer.time >= older.time);
                    assert_eq!(newer.lines, previous - 1);
                    previous = newer.lines;
                }
            }
            assert_eq!(points.len(), population.len() - last.lines + 1);
        }
    }
}
