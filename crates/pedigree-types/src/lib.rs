//! Shared type definitions for the pedigree simulation.
//!
//! This crate is the single source of truth for the records passed between
//! the simulation engine, the coalescence analysis and the report layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe person identifier
//! - [`enums`] -- Sex and event kinds
//! - [`structs`] -- People, ancestor snapshots, events and output records
//! - [`source`] -- [`AncestorSource`], read-only lookup of ancestors by id
//! - [`error`] -- Invariant violations on person records ([`PersonError`])

pub mod enums;
pub mod error;
pub mod ids;
pub mod source;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EventKind, Sex};
pub use error::PersonError;
pub use ids::PersonId;
pub use source::AncestorSource;
pub use structs::{
    Ancestor, CoalescencePoint, Event, MatingAges, MatingWindows, Person, PopulationSample,
};
