//! Error types for the pedigree-types crate.

use crate::ids::PersonId;

/// Errors raised when a [`Person`](crate::Person) record would violate its
/// invariants.
#[derive(Debug, thiserror::Error)]
pub enum PersonError {
    /// The death time was already determined.
    #[error("death time of person {id} is already set")]
    DeathAlreadySet {
        /// The person whose death time was set twice.
        id: PersonId,
    },

    /// The proposed death time does not come after the birth time.
    #[error("death time {death_time} of person {id} does not exceed birth time {birth_time}")]
    DeathNotAfterBirth {
        /// The person being updated.
        id: PersonId,
        /// The person's birth time.
        birth_time: f64,
        /// The rejected death time.
        death_time: f64,
    },
}
