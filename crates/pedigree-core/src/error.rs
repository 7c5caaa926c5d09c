//! Error types for the simulation engine.

use pedigree_queue::QueueError;

use crate::age::AgeModelError;
use crate::config::ConfigError;
use crate::registry::RegistryError;

/// Errors that can occur while building or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The age model could not be constructed.
    #[error("age model error: {0}")]
    AgeModel(#[from] AgeModelError),

    /// A heap operation failed.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// The person registry rejected an operation.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The reproduction intensity could not be derived from the age model
    /// and mating window.
    #[error("cannot calibrate reproduction rate: {reason}")]
    Calibration {
        /// Why calibration failed.
        reason: String,
    },
}
