//! Age-at-death and waiting-time sampling.
//!
//! [`AgeModel`] is a Gompertz-Makeham mortality law: the hazard at age `a`
//! is `accident_rate + death_rate * exp(a / age_scale)`. Lifespans are drawn
//! as the earlier of an accidental death (constant hazard) and a senescent
//! death (exponentially growing hazard), both sampled by inversion.
//!
//! The engine only talks to the [`AgeSampler`] trait, so tests can plug in a
//! deterministic sampler.

use rand::Rng;
use rand::distr::Open01;

use crate::config::AgeModelConfig;

/// Integration step for survival integrals: one month.
const INTEGRATION_STEP: f64 = 1.0 / 12.0;

/// Survival below which [`AgeModel::expected_lifespan`] stops integrating.
const NEGLIGIBLE_SURVIVAL: f64 = 1.0e-9;

/// Hard stop for [`AgeModel::expected_lifespan`], in years.
const MAX_INTEGRATION_AGE: f64 = 1_000.0;

/// Errors raised when constructing an age model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgeModelError {
    /// A parameter is zero, negative, or not finite.
    #[error("age model parameter {name} must be finite and positive, got {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Source of lifespans and exponential waiting times.
pub trait AgeSampler {
    /// Draw a lifespan in years. Always strictly positive.
    fn sample_lifespan<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;

    /// Draw an exponential waiting time with the given rate (events per
    /// year). Strictly positive for a positive finite rate.
    fn sample_waiting_time<R: Rng + ?Sized>(&self, rng: &mut R, rate: f64) -> f64;

    /// Expected number of years a newborn spends alive within
    /// `[min_age, max_age]`.
    fn expected_fertile_span(&self, min_age: f64, max_age: f64) -> f64;
}

/// Gompertz-Makeham age model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeModel {
    accident_rate: f64,
    death_rate: f64,
    age_scale: f64,
}

impl AgeModel {
    /// Create a model from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AgeModelError::InvalidParameter`] if any parameter is not
    /// finite and positive.
    pub fn new(accident_rate: f64, death_rate: f64, age_scale: f64) -> Result<Self, AgeModelError> {
        check_parameter("accident_rate", accident_rate)?;
        check_parameter("death_rate", death_rate)?;
        check_parameter("age_scale", age_scale)?;
        Ok(Self {
            accident_rate,
            death_rate,
            age_scale,
        })
    }

    /// Create a model from the `age_model` configuration section.
    ///
    /// # Errors
    ///
    /// See [`AgeModel::new`].
    pub fn from_config(config: &AgeModelConfig) -> Result<Self, AgeModelError> {
        Self::new(config.accident_rate, config.death_rate, config.age_scale)
    }

    /// Age-independent hazard.
    pub const fn accident_rate(&self) -> f64 {
        self.accident_rate
    }

    /// Senescent hazard at birth.
    pub const fn death_rate(&self) -> f64 {
        self.death_rate
    }

    /// Growth scale of the senescent hazard.
    pub const fn age_scale(&self) -> f64 {
        self.age_scale
    }

    /// Instantaneous hazard of dying at `age`.
    pub fn hazard(&self, age: f64) -> f64 {
        self.death_rate
            .mul_add((age / self.age_scale).exp(), self.accident_rate)
    }

    /// Probability of surviving past `age`.
    pub fn survival(&self, age: f64) -> f64 {
        if age <= 0.0 {
            return 1.0;
        }
        let senescent = self.death_rate * self.age_scale * (age / self.age_scale).exp_m1();
        (-self.accident_rate).mul_add(age, -senescent).exp()
    }

    /// Expected lifespan at birth, integrating survival until it becomes
    /// negligible.
    pub fn expected_lifespan(&self) -> f64 {
        let mut total = 0.0;
        let mut age = 0.0;
        let mut previous = self.survival(age);
        while previous > NEGLIGIBLE_SURVIVAL && age < MAX_INTEGRATION_AGE {
            age += INTEGRATION_STEP;
            let current = self.survival(age);
            total = (0.5 * INTEGRATION_STEP).mul_add(previous + current, total);
            previous = current;
        }
        total
    }
}

impl Default for AgeModel {
    fn default() -> Self {
        let config = AgeModelConfig::default();
        Self {
            accident_rate: config.accident_rate,
            death_rate: config.death_rate,
            age_scale: config.age_scale,
        }
    }
}

impl AgeSampler for AgeModel {
    fn sample_lifespan<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let accidental = standard_exponential(rng) / self.accident_rate;
        let scaled = standard_exponential(rng) / (self.death_rate * self.age_scale);
        let senescent = self.age_scale * scaled.ln_1p();
        accidental.min(senescent)
    }

    fn sample_waiting_time<R: Rng + ?Sized>(&self, rng: &mut R, rate: f64) -> f64 {
        standard_exponential(rng) / rate
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn expected_fertile_span(&self, min_age: f64, max_age: f64) -> f64 {
        let width = max_age - min_age;
        if !width.is_finite() || width <= 0.0 {
            return 0.0;
        }
        let steps = (width / INTEGRATION_STEP).ceil().max(1.0) as u64;
        let step = width / steps as f64;
        let mut total = 0.0;
        let mut previous = self.survival(min_age);
        for i in 1..=steps {
            let current = self.survival((i as f64).mul_add(step, min_age));
            total = (0.5 * step).mul_add(previous + current, total);
            previous = current;
        }
        total
    }
}

/// `-ln(U)` with `U` uniform on the open unit interval; strictly positive.
fn standard_exponential<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u: f64 = rng.sample(Open01);
    -u.ln()
}

fn check_parameter(name: &'static str, value: f64) -> Result<(), AgeModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AgeModelError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn rejects_non_positive_parameters() {
        assert!(AgeModel::new(0.0, 1.0e-4, 11.0).is_err());
        assert!(AgeModel::new(0.01, -1.0, 11.0).is_err());
        let err = AgeModel::new(0.01, 1.0e-4, f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            AgeModelError::InvalidParameter {
                name: "age_scale",
                ..
            }
        ));
    }

    #[test]
    fn default_matches_config_defaults() {
        let model = AgeModel::from_config(&AgeModelConfig::default()).unwrap();
        assert_eq!(model, AgeModel::default());
    }

    #[test]
    fn survival_is_decreasing_from_one() {
        let model = AgeModel::default();
        assert_eq!(model.survival(0.0), 1.0);
        let mut previous = 1.0;
        for age in (1..=120).map(f64::from) {
            let current = model.survival(age);
            assert!(current < previous, "survival rose at age {age}");
            previous = current;
        }
        assert!(model.survival(150.0) < 1.0e-6);
    }

    #[test]
    fn hazard_grows_with_age() {
        let model = AgeModel::default();
        assert!(model.hazard(80.0) > model.hazard(20.0));
        assert!(model.hazard(0.0) > model.accident_rate());
    }

    #[test]
    fn lifespans_are_positive_and_plausible() {
        let model = AgeModel::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let samples: Vec<f64> = (0..5_000).map(|_| model.sample_lifespan(&mut rng)).collect();
        assert!(samples.iter().all(|&x| x > 0.0 && x.is_finite()));

        let mean = samples.iter().sum::<f64>() / 5_000.0;
        let expected = model.expected_lifespan();
        assert!(
            (mean - expected).abs() < 2.5,
            "sample mean {mean} too far from expected {expected}"
        );
    }

    #[test]
    fn waiting_times_follow_rate() {
        let model = AgeModel::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let rate = 0.25;
        let samples: Vec<f64> = (0..10_000)
            .map(|_| model.sample_waiting_time(&mut rng, rate))
            .collect();
        assert!(samples.iter().all(|&x| x > 0.0));
        let mean = samples.iter().sum::<f64>() / 10_000.0;
        assert!((mean - 4.0).abs() < 0.2, "mean waiting time {mean}");
    }

    #[test]
    fn fertile_span_is_bounded_by_window() {
        let model = AgeModel::default();
        let span = model.expected_fertile_span(16.0, 50.0);
        assert!(span > 0.0);
        assert!(span < 34.0);
        // Survival over 16..50 is high under default parameters.
        assert!(span > 20.0, "fertile span {span}");
    }

    #[test]
    fn degenerate_window_has_no_span() {
        let model = AgeModel::default();
        assert_eq!(model.expected_fertile_span(50.0, 16.0), 0.0);
        assert_eq!(model.expected_fertile_span(30.0, 30.0), 0.0);
    }
}
