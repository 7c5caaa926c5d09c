//! The living population: one min-heap per sex ordered by death time.
//!
//! Entries carry their own death time so that ordering never needs to
//! consult the registry. A death sweep pops every entry at the front whose
//! death time has passed; people who are still alive stay where they are.

use core::cmp::Ordering;

use pedigree_queue::{PriorityQueue, QueueError};
use pedigree_types::{PersonId, Sex};

/// A living person as seen by the population heaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivingEntry {
    /// When this person dies.
    pub death_time: f64,
    /// Who this is.
    pub id: PersonId,
}

impl LivingEntry {
    /// Create an entry.
    pub const fn new(id: PersonId, death_time: f64) -> Self {
        Self { death_time, id }
    }

    /// Orders by death time, then by id.
    pub fn by_death_time(a: &Self, b: &Self) -> Ordering {
        a.death_time
            .total_cmp(&b.death_time)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Living females and males, each in a min-heap keyed by death time.
#[derive(Debug, Clone)]
pub struct LivingPopulation {
    females: PriorityQueue<LivingEntry>,
    males: PriorityQueue<LivingEntry>,
}

impl LivingPopulation {
    /// Create empty heaps with the given arity.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidArity`] if `arity < 2`.
    pub fn new(arity: usize) -> Result<Self, QueueError> {
        Ok(Self {
            females: PriorityQueue::min(arity, LivingEntry::by_death_time)?,
            males: PriorityQueue::min(arity, LivingEntry::by_death_time)?,
        })
    }

    /// Add a newborn to the heap of their sex.
    pub fn insert(&mut self, sex: Sex, entry: LivingEntry) {
        self.heap_mut(sex).insert(entry);
    }

    /// Remove everyone whose death time is at or before `time`.
    ///
    /// Returns how many entries were removed.
    ///
    /// # Errors
    ///
    /// Propagates [`QueueError::Empty`], which only occurs if a heap reports
    /// a root and then fails to yield it.
    pub fn sweep(&mut self, time: f64) -> Result<usize, QueueError> {
        let males = sweep_heap(&mut self.males, time)?;
        let females = sweep_heap(&mut self.females, time)?;
        Ok(males.saturating_add(females))
    }

    /// Total number of living people.
    pub fn size(&self) -> usize {
        self.females.len().saturating_add(self.males.len())
    }

    /// Number of living people of one sex.
    pub fn count(&self, sex: Sex) -> usize {
        self.heap(sex).len()
    }

    /// Living entries of one sex, in heap (backing) order.
    pub fn members(&self, sex: Sex) -> &[LivingEntry] {
        self.heap(sex).as_slice()
    }

    /// Living males, in heap order. Used for uniform father sampling.
    pub fn males(&self) -> &[LivingEntry] {
        self.males.as_slice()
    }

    /// The soonest death time among living people of one sex.
    pub fn earliest_death(&self, sex: Sex) -> Option<f64> {
        self.heap(sex).peek().map(|entry| entry.death_time)
    }

    /// The heap holding one sex.
    pub const fn heap(&self, sex: Sex) -> &PriorityQueue<LivingEntry> {
        match sex {
            Sex::Female => &self.females,
            Sex::Male => &self.males,
        }
    }

    const fn heap_mut(&mut self, sex: Sex) -> &mut PriorityQueue<LivingEntry> {
        match sex {
            Sex::Female => &mut self.females,
            Sex::Male => &mut self.males,
        }
    }
}

fn sweep_heap(heap: &mut PriorityQueue<LivingEntry>, time: f64) -> Result<usize, QueueError> {
    let mut removed = 0_usize;
    while heap.peek().is_some_and(|entry| entry.death_time <= time) {
        heap.extract_root()?;
        removed = removed.saturating_add(1);
    }
    Ok(removed)
}
