//! Type-safe identifier for people in the simulation.
//!
//! Identifiers are assigned monotonically by the person registry in
//! creation order, starting at 0. An identifier doubles as the index of the
//! record in the registry's append-only arena, so lookups are O(1) and an id
//! stays valid for the whole run.

use serde::{Deserialize, Serialize};

/// Unique identifier for a person in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl PersonId {
    /// Create an identifier from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw `u64` value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Return the arena index this identifier refers to, if it fits in
    /// `usize` on this platform.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl core::fmt::Display for PersonId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<PersonId> for u64 {
    fn from(id: PersonId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_creation() {
        let first = PersonId::new(3);
        let later = PersonId::new(10);
        assert!(first < later);
        assert_eq!(later.into_inner(), 10);
    }

    #[test]
    fn id_index_matches_raw_value() {
        assert_eq!(PersonId::new(42).index(), Some(42));
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = PersonId::new(7);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("7"));
        let restored: Result<PersonId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_raw() {
        assert_eq!(PersonId::new(5).to_string(), "5");
    }
}
