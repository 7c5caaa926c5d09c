//! Enumeration types for the pedigree simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Biological sex of a person.
///
/// Determines which living-population heap the person joins, which mating
/// age window applies, and which parent an ancestral line follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Female; schedules reproduction events and follows the maternal line.
    Female,
    /// Male; selected as a father and follows the paternal line.
    Male,
}

impl Sex {
    /// Draw a sex uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Self::Female
        } else {
            Self::Male
        }
    }

    /// Whether this is [`Sex::Female`].
    pub const fn is_female(self) -> bool {
        matches!(self, Self::Female)
    }

    /// Whether this is [`Sex::Male`].
    pub const fn is_male(self) -> bool {
        matches!(self, Self::Male)
    }
}

impl core::fmt::Display for Sex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Female => write!(f, "F"),
            Self::Male => write!(f, "M"),
        }
    }
}

// ---------------------------------------------------------------------------
// Event kind
// ---------------------------------------------------------------------------

/// The kind of a scheduled simulation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The subject is born: lifespan sampled, death scheduled, joins the
    /// living population.
    Birth,
    /// The subject (always female) attempts to reproduce.
    Reproduction,
    /// Sweep trigger: everyone whose death time has passed leaves the
    /// living population.
    Death,
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Birth => write!(f, "birth"),
            Self::Reproduction => write!(f, "reproduction"),
            Self::Death => write!(f, "death"),
        }
    }
}
