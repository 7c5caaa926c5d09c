//! Read-only access to ancestor snapshots by id.
//!
//! The coalescence analysis walks parent links backward through time and
//! needs a snapshot of every parent it reaches. [`AncestorSource`] is the
//! seam between that analysis and whatever holds the genealogy: the
//! simulation's frozen person registry in production, a plain map in tests.

use std::collections::BTreeMap;

use crate::ids::PersonId;
use crate::structs::Ancestor;

/// Resolves person ids to read-only ancestor snapshots.
pub trait AncestorSource {
    /// Snapshot of the person with the given id, if known.
    fn ancestor(&self, id: PersonId) -> Option<Ancestor>;
}

impl AncestorSource for BTreeMap<PersonId, Ancestor> {
    fn ancestor(&self, id: PersonId) -> Option<Ancestor> {
        self.get(&id).copied()
    }
}

impl<S: AncestorSource + ?Sized> AncestorSource for &S {
    fn ancestor(&self, id: PersonId) -> Option<Ancestor> {
        (**self).ancestor(id)
    }
}
