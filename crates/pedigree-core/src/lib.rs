//! Event-driven population engine for the pedigree simulation.
//!
//! This crate advances a population of people through births, reproduction
//! attempts and deaths on a continuous clock, then freezes the genealogy for
//! coalescence analysis.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `pedigree-config.yaml` into
//!   strongly-typed structs, plus validated run parameters.
//! - [`age`] -- [`AgeSampler`] trait and the Gompertz-Makeham [`AgeModel`].
//! - [`registry`] -- Append-only arena owning every person record.
//! - [`population`] -- Per-sex living-population heaps keyed by death time.
//! - [`mating`] -- Father selection with fidelity and infidelity.
//! - [`simulation`] -- The engine loop and its [`SimulationOutcome`].
//! - [`error`] -- [`SimulationError`], wrapping every failure above.
//!
//! [`AgeSampler`]: age::AgeSampler
//! [`AgeModel`]: age::AgeModel
//! [`SimulationOutcome`]: simulation::SimulationOutcome
//! [`SimulationError`]: error::SimulationError

pub mod age;
pub mod config;
pub mod error;
pub mod mating;
pub mod population;
pub mod registry;
pub mod simulation;

pub use age::{AgeModel, AgeModelError, AgeSampler};
pub use config::{ConfigError, RunParameters, SimulationConfig};
pub use error::SimulationError;
pub use registry::{Registry, RegistryError};
pub use simulation::{
    RunStats, Simulation, SimulationEndReason, SimulationOutcome, StepOutcome,
};
