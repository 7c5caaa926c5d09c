//! Error types for the pedigree engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes from argument validation through report rendering.

/// Top-level error for the pedigree engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pedigree_core::ConfigError,
    },

    /// The simulation failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: pedigree_core::SimulationError,
    },

    /// Tracing ancestral lines failed.
    #[error("coalescence error: {source}")]
    Coalescence {
        /// The underlying coalescence error.
        #[from]
        source: pedigree_coalescence::CoalescenceError,
    },

    /// The JSON report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
