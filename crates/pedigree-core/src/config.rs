//! Configuration loading and typed config structures for the pedigree
//! simulation.
//!
//! The optional configuration file is `pedigree-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader, and the validation that every engine constructor runs
//! before any simulation state exists.
//!
//! Run parameters (founder count and horizon) are not part of the file; they
//! come from the command line and are validated by [`RunParameters`].

use std::path::Path;

use pedigree_types::{MatingAges, MatingWindows};
use serde::Deserialize;

/// Environment variable overriding `run.seed`.
pub const SEED_ENV_VAR: &str = "PEDIGREE_SEED";

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `pedigree-config.yaml`. Every section has
/// defaults, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run-level settings (random seed).
    #[serde(default)]
    pub run: RunConfig,

    /// Parameters of the age-at-death model.
    #[serde(default)]
    pub age_model: AgeModelConfig,

    /// Reproduction intensity calibration and mate fidelity.
    #[serde(default)]
    pub reproduction: ReproductionConfig,

    /// Mating age windows per sex.
    #[serde(default)]
    pub mating: MatingWindows,

    /// Population sampling cadence.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Heap layout for the event queue and living-population indices.
    #[serde(default)]
    pub queue: QueueConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `PEDIGREE_SEED` overrides `run.seed` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the seed override is not a `u64`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.run.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Unlike [`from_file`](Self::from_file), no environment overrides are
    /// applied, so parsing is a pure function of its input.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.age_model.validate()?;
        self.reproduction.validate()?;
        validate_window("mating.female", &self.mating.female)?;
        validate_window("mating.male", &self.mating.male)?;
        self.sampling.validate()?;
        self.queue.validate()
    }
}

/// Run-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl RunConfig {
    /// Override the seed with `PEDIGREE_SEED` when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the variable is not a `u64`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            self.seed = val.trim().parse().map_err(|err| ConfigError::Invalid {
                reason: format!("{SEED_ENV_VAR}={val:?} is not a valid seed: {err}"),
            })?;
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// Gompertz-Makeham age model parameters.
///
/// Hazard of dying at age `a` is `accident_rate + death_rate * exp(a / age_scale)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgeModelConfig {
    /// Age-independent hazard per year (accidents).
    #[serde(default = "default_accident_rate")]
    pub accident_rate: f64,

    /// Senescent hazard per year at birth.
    #[serde(default = "default_death_rate")]
    pub death_rate: f64,

    /// Years over which the senescent hazard grows by a factor of e.
    #[serde(default = "default_age_scale")]
    pub age_scale: f64,
}

impl AgeModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("age_model.accident_rate", self.accident_rate)?;
        validate_positive("age_model.death_rate", self.death_rate)?;
        validate_positive("age_model.age_scale", self.age_scale)
    }
}

impl Default for AgeModelConfig {
    fn default() -> Self {
        Self {
            accident_rate: default_accident_rate(),
            death_rate: default_death_rate(),
            age_scale: default_age_scale(),
        }
    }
}

/// Reproduction parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReproductionConfig {
    /// Target expected number of reproductions per female over her
    /// fertile span; calibrates the reproduction intensity.
    #[serde(default = "default_expected_offspring")]
    pub expected_offspring: f64,

    /// Probability that a female in a relationship stays with her mate.
    #[serde(default = "default_fidelity")]
    pub fidelity: f64,
}

impl ReproductionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("reproduction.expected_offspring", self.expected_offspring)?;
        if !(0.0..=1.0).contains(&self.fidelity) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "reproduction.fidelity must be within [0, 1], got {}",
                    self.fidelity
                ),
            });
        }
        Ok(())
    }
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            expected_offspring: default_expected_offspring(),
            fidelity: default_fidelity(),
        }
    }
}

/// Population sampling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SamplingConfig {
    /// Time between population samples.
    #[serde(default = "default_sampling_period")]
    pub period: f64,

    /// When the clock jumps past several periods at once, move the next
    /// sampling threshold past the clock instead of by a single period.
    #[serde(default)]
    pub catch_up: bool,
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("sampling.period", self.period)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period: default_sampling_period(),
            catch_up: false,
        }
    }
}

/// Heap layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueConfig {
    /// Children per node for the event queue and living-population heaps.
    #[serde(default = "default_arity")]
    pub arity: usize,
}

impl QueueConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.arity < 2 {
            return Err(ConfigError::Invalid {
                reason: format!("queue.arity must be at least 2, got {}", self.arity),
            });
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            arity: default_arity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run parameters
// ---------------------------------------------------------------------------

/// Founder count and horizon for a single run.
///
/// Both must be positive integers; invalid values are rejected before any
/// simulation state is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParameters {
    founders: usize,
    horizon: u64,
}

impl RunParameters {
    /// Validate raw command-line values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either value is not positive.
    pub fn new(founders: i64, horizon: i64) -> Result<Self, ConfigError> {
        if founders <= 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "illegal number of founders (n = {founders}); must be a positive integer"
                ),
            });
        }
        if horizon <= 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "illegal maximum time (Tmax = {horizon}); must be a positive integer"
                ),
            });
        }
        let founders = usize::try_from(founders).map_err(|err| ConfigError::Invalid {
            reason: format!("founder count {founders} does not fit in memory: {err}"),
        })?;
        let horizon = u64::try_from(horizon).map_err(|err| ConfigError::Invalid {
            reason: format!("horizon {horizon} is out of range: {err}"),
        })?;
        Ok(Self { founders, horizon })
    }

    /// Build parameters without the positivity check.
    ///
    /// Test support for degenerate runs such as a zero horizon (founders are
    /// born and the run stops immediately). Not part of the public API.
    #[doc(hidden)]
    pub const fn unchecked(founders: usize, horizon: u64) -> Self {
        Self { founders, horizon }
    }

    /// Number of founders seeded at time 0.
    pub const fn founders(&self) -> usize {
        self.founders
    }

    /// Horizon as an integer number of years.
    pub const fn horizon(&self) -> u64 {
        self.horizon
    }

    /// Horizon on the simulation clock.
    #[allow(clippy::cast_precision_loss)]
    pub const fn horizon_time(&self) -> f64 {
        self.horizon as f64
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be a finite positive number, got {value}"),
        })
    }
}

fn validate_window(name: &str, window: &MatingAges) -> Result<(), ConfigError> {
    let finite = window.min_age.is_finite() && window.max_age.is_finite();
    if !finite || window.min_age < 0.0 || window.min_age >= window.max_age {
        return Err(ConfigError::Invalid {
            reason: format!(
                "{name} must satisfy 0 <= min_age < max_age, got [{}, {}]",
                window.min_age, window.max_age
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_accident_rate() -> f64 {
    0.01
}

const fn default_death_rate() -> f64 {
    0.0001
}

const fn default_age_scale() -> f64 {
    11.0
}

const fn default_expected_offspring() -> f64 {
    2.0
}

const fn default_fidelity() -> f64 {
    0.9
}

const fn default_sampling_period() -> f64 {
    100.0
}

const fn default_arity() -> usize {
    4
}
