//! The person registry: an append-only arena owning every person record.
//!
//! Ids are assigned in creation order starting at 0 and double as indices
//! into the arena. Records are never removed during a run; leaving the
//! living population only drops the entry from the engine's heaps. Links
//! between people (parents, mate) are ids resolved through the registry.

use pedigree_types::{Ancestor, AncestorSource, Person, PersonError, PersonId, Sex};

/// Errors raised by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No record exists for the id.
    #[error("unknown person {id}")]
    UnknownPerson {
        /// The unresolved id.
        id: PersonId,
    },

    /// The arena cannot hand out another id.
    #[error("person id space exhausted after {count} records")]
    IdOverflow {
        /// Number of records already created.
        count: usize,
    },

    /// A record rejected an update.
    #[error(transparent)]
    Person(#[from] PersonError),
}

/// Append-only store of every person created during a run.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    people: Vec<Person>,
}

impl Registry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { people: Vec::new() }
    }

    /// Number of people ever created.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    /// Whether no one has been created yet.
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Create a founder born at time 0.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IdOverflow`] if no further id is available.
    pub fn create_founder(&mut self, sex: Sex) -> Result<PersonId, RegistryError> {
        let id = self.next_id()?;
        self.people.push(Person::founder(id, sex));
        Ok(id)
    }

    /// Create a child of `mother` and `father` born at `birth_time`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPerson`] if either parent is not
    /// registered, or [`RegistryError::IdOverflow`].
    pub fn create_child(
        &mut self,
        sex: Sex,
        birth_time: f64,
        mother: PersonId,
        father: PersonId,
    ) -> Result<PersonId, RegistryError> {
        self.person(mother)?;
        self.person(father)?;
        let id = self.next_id()?;
        self.people
            .push(Person::new(id, sex, birth_time, Some(mother), Some(father)));
        Ok(id)
    }

    /// Look up a person.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        id.index().and_then(|index| self.people.get(index))
    }

    /// Look up a person, failing on an unknown id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPerson`].
    pub fn person(&self, id: PersonId) -> Result<&Person, RegistryError> {
        self.get(id).ok_or(RegistryError::UnknownPerson { id })
    }

    fn person_mut(&mut self, id: PersonId) -> Result<&mut Person, RegistryError> {
        id.index()
            .and_then(|index| self.people.get_mut(index))
            .ok_or(RegistryError::UnknownPerson { id })
    }

    /// Fix a person's death time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPerson`], or [`RegistryError::Person`]
    /// if the death time was already set or does not follow birth.
    pub fn set_death_time(&mut self, id: PersonId, death_time: f64) -> Result<(), RegistryError> {
        self.person_mut(id)?.set_death_time(death_time)?;
        Ok(())
    }

    /// Make `a` and `b` each other's mate, replacing any previous links.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPerson`] if either id is unknown; in
    /// that case neither record is modified.
    pub fn pair(&mut self, a: PersonId, b: PersonId) -> Result<(), RegistryError> {
        self.person(b)?;
        self.person_mut(a)?.set_mate(b);
        self.person_mut(b)?.set_mate(a);
        Ok(())
    }

    /// The mate of `id` if the relationship still holds at `time`: the mate
    /// is alive and still points back at `id`.
    pub fn current_mate(&self, id: PersonId, time: f64) -> Option<PersonId> {
        let mate_id = self.get(id)?.mate()?;
        let mate = self.get(mate_id)?;
        (mate.is_alive(time) && mate.mate() == Some(id)).then_some(mate_id)
    }

    /// Whether `id` is in a mutual relationship with a living mate.
    pub fn is_in_relationship(&self, id: PersonId, time: f64) -> bool {
        self.current_mate(id, time).is_some()
    }

    /// Read-only snapshot of a person.
    pub fn snapshot(&self, id: PersonId) -> Option<Ancestor> {
        self.get(id).map(Ancestor::from)
    }

    /// Iterate over every record in creation order.
    pub fn iter(&self) -> core::slice::Iter<'_, Person> {
        self.people.iter()
    }

    fn next_id(&self) -> Result<PersonId, RegistryError> {
        let count = self.people.len();
        u64::try_from(count)
            .ok()
            .map(PersonId::new)
            .ok_or(RegistryError::IdOverflow { count })
    }
}

impl AncestorSource for Registry {
    fn ancestor(&self, id: PersonId) -> Option<Ancestor> {
        self.snapshot(id)
    }
}
