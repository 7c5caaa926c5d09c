//! Core entity structs for the pedigree simulation.
//!
//! [`Person`] is the live, mutable record owned by the registry. [`Ancestor`]
//! is the read-only snapshot consumed by the coalescence analysis, and
//! [`Event`] is the timestamped unit of work on the engine's clock.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::enums::{EventKind, Sex};
use crate::error::PersonError;
use crate::ids::PersonId;

// ---------------------------------------------------------------------------
// Mating windows
// ---------------------------------------------------------------------------

/// Inclusive age bounds (in years) within which a person may reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatingAges {
    /// Youngest age at which reproduction is possible.
    pub min_age: f64,
    /// Oldest age at which reproduction is possible.
    pub max_age: f64,
}

impl MatingAges {
    /// Create a new window from explicit bounds.
    pub const fn new(min_age: f64, max_age: f64) -> Self {
        Self { min_age, max_age }
    }

    /// Whether `age` falls inside the window (bounds included).
    pub fn contains(&self, age: f64) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

/// Mating windows for both sexes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatingWindows {
    /// Window applying to females (default 16--50).
    #[serde(default = "default_female_window")]
    pub female: MatingAges,
    /// Window applying to males (default 16--73).
    #[serde(default = "default_male_window")]
    pub male: MatingAges,
}

impl MatingWindows {
    /// Return the window for the given sex.
    pub const fn for_sex(&self, sex: Sex) -> &MatingAges {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }
}

impl Default for MatingWindows {
    fn default() -> Self {
        Self {
            female: default_female_window(),
            male: default_male_window(),
        }
    }
}

const fn default_female_window() -> MatingAges {
    MatingAges::new(16.0, 50.0)
}

const fn default_male_window() -> MatingAges {
    MatingAges::new(16.0, 73.0)
}

// ---------------------------------------------------------------------------
// Person (live record)
// ---------------------------------------------------------------------------

/// A member of the simulated population.
///
/// Identity, sex, birth time and parents are fixed at creation. The death
/// time starts at `+inf` ("not yet determined") and is set exactly once when
/// the birth event is processed. Parent and mate links are weak: they are
/// ids resolved through the registry that owns every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    sex: Sex,
    birth_time: f64,
    death_time: f64,
    mother: Option<PersonId>,
    father: Option<PersonId>,
    mate: Option<PersonId>,
}

impl Person {
    /// Create a founder: no parents, born at time 0.
    pub const fn founder(id: PersonId, sex: Sex) -> Self {
        Self::new(id, sex, 0.0, None, None)
    }

    /// Create a person with the given parents and birth time.
    ///
    /// The death time is left undetermined (`+inf`) and there is no mate.
    pub const fn new(
        id: PersonId,
        sex: Sex,
        birth_time: f64,
        mother: Option<PersonId>,
        father: Option<PersonId>,
    ) -> Self {
        Self {
            id,
            sex,
            birth_time,
            death_time: f64::INFINITY,
            mother,
            father,
            mate: None,
        }
    }

    /// Unique identifier.
    pub const fn id(&self) -> PersonId {
        self.id
    }

    /// Biological sex.
    pub const fn sex(&self) -> Sex {
        self.sex
    }

    /// Time of birth.
    pub const fn birth_time(&self) -> f64 {
        self.birth_time
    }

    /// Time of death, `+inf` until the birth event has been processed.
    pub const fn death_time(&self) -> f64 {
        self.death_time
    }

    /// Mother, if any.
    pub const fn mother(&self) -> Option<PersonId> {
        self.mother
    }

    /// Father, if any.
    pub const fn father(&self) -> Option<PersonId> {
        self.father
    }

    /// Most recent mate, if any. The link may be stale; the registry decides
    /// whether the relationship is still mutual.
    pub const fn mate(&self) -> Option<PersonId> {
        self.mate
    }

    /// Point this person's mate link at `mate`.
    pub const fn set_mate(&mut self, mate: PersonId) {
        self.mate = Some(mate);
    }

    /// Whether the death time has been determined.
    pub const fn has_death_time(&self) -> bool {
        self.death_time.is_finite()
    }

    /// Fix the death time.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError::DeathAlreadySet`] on a second call and
    /// [`PersonError::DeathNotAfterBirth`] if `death_time` does not exceed
    /// the birth time (or is not finite).
    pub fn set_death_time(&mut self, death_time: f64) -> Result<(), PersonError> {
        if self.has_death_time() {
            return Err(PersonError::DeathAlreadySet { id: self.id });
        }
        if !death_time.is_finite() || death_time <= self.birth_time {
            return Err(PersonError::DeathNotAfterBirth {
                id: self.id,
                birth_time: self.birth_time,
                death_time,
            });
        }
        self.death_time = death_time;
        Ok(())
    }

    /// A founder has neither mother nor father.
    pub const fn is_founder(&self) -> bool {
        self.mother.is_none() && self.father.is_none()
    }

    /// Alive strictly before the death time.
    pub fn is_alive(&self, time: f64) -> bool {
        time < self.death_time
    }

    /// Alive and inside the mating window of this person's sex at `time`.
    pub fn is_mating_age(&self, time: f64, windows: &MatingWindows) -> bool {
        self.is_alive(time) && windows.for_sex(self.sex).contains(time - self.birth_time)
    }

    /// The parent an ancestral line follows: the father for males, the
    /// mother for females.
    pub const fn lineage_parent(&self) -> Option<PersonId> {
        match self.sex {
            Sex::Male => self.father,
            Sex::Female => self.mother,
        }
    }
}

/// Renders `person.<id>/<sex>`, or nothing for an absent link.
fn fmt_link(id: Option<PersonId>, sex_hint: Option<Sex>) -> String {
    match (id, sex_hint) {
        (Some(id), Some(sex)) => format!("person.{id}/{sex}"),
        (Some(id), None) => format!("person.{id}"),
        (None, _) => String::new(),
    }
}

impl core::fmt::Display for Person {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} [{:.1}, {:.1}, mate {}\tmom {}\tdad {}]",
            fmt_link(Some(self.id), Some(self.sex)),
            self.birth_time,
            self.death_time,
            fmt_link(self.mate, None),
            fmt_link(self.mother, Some(Sex::Female)),
            fmt_link(self.father, Some(Sex::Male)),
        )
    }
}

// ---------------------------------------------------------------------------
// Ancestor (read-only snapshot)
// ---------------------------------------------------------------------------

/// Frozen copy of a [`Person`] used by the coalescence analysis.
///
/// Decoupled from the live record so that walking ancestry backward never
/// observes (or needs to coordinate with) simulation mutations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ancestor {
    /// Identifier of the person this snapshot was taken from.
    pub id: PersonId,
    /// Biological sex.
    pub sex: Sex,
    /// Time of birth.
    pub birth_time: f64,
    /// Time of death at the moment of the snapshot.
    pub death_time: f64,
    /// Mother, if any.
    pub mother: Option<PersonId>,
    /// Father, if any.
    pub father: Option<PersonId>,
}

impl Ancestor {
    /// A founder has neither mother nor father.
    pub const fn is_founder(&self) -> bool {
        self.mother.is_none() && self.father.is_none()
    }

    /// The father for males, the mother for females.
    pub const fn lineage_parent(&self) -> Option<PersonId> {
        match self.sex {
            Sex::Male => self.father,
            Sex::Female => self.mother,
        }
    }

    /// Orders by birth time, then by id.
    ///
    /// Used with a max-heap so the most recently born ancestor surfaces first.
    pub fn by_birth_time(a: &Self, b: &Self) -> Ordering {
        a.birth_time
            .total_cmp(&b.birth_time)
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl From<&Person> for Ancestor {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            sex: person.sex,
            birth_time: person.birth_time,
            death_time: person.death_time,
            mother: person.mother,
            father: person.father,
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A timestamped unit of work for the simulation clock.
///
/// `sequence` is assigned by the engine when the event is scheduled and only
/// breaks ties between events with identical times (first scheduled, first
/// processed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// When the event fires.
    pub time: f64,
    /// What happens.
    pub kind: EventKind,
    /// Who it happens to.
    pub subject: PersonId,
    /// Scheduling order, used as the tie-breaker.
    pub sequence: u64,
}

impl Event {
    /// Create a new event.
    pub const fn new(time: f64, kind: EventKind, subject: PersonId, sequence: u64) -> Self {
        Self {
            time,
            kind,
            subject,
            sequence,
        }
    }

    /// Orders by time, then by scheduling sequence.
    pub fn chronological(a: &Self, b: &Self) -> Ordering {
        a.time
            .total_cmp(&b.time)
            .then_with(|| a.sequence.cmp(&b.sequence))
    }
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{{ subject: person.{}, kind: {}, time: {:.2} }}",
            self.subject, self.kind, self.time
        )
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Living population size observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSample {
    /// Clock time of the observation.
    pub time: f64,
    /// Number of living people (both sexes).
    pub size: usize,
}

/// A step of the ancestral-line count, read backward in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoalescencePoint {
    /// Birth time of the younger of the two merging individuals (0 for the
    /// closing point).
    pub time: f64,
    /// Number of ancestral lines still distinct after the merge.
    pub lines: usize,
}
