//! The event-driven population engine.
//!
//! [`Simulation`] owns the clock, the event queue, the living-population
//! heaps and the person registry. Events are processed strictly in time
//! order (ties in scheduling order):
//!
//! - **Birth** -- sample a lifespan, schedule the death, schedule a first
//!   reproduction for females, join the living population.
//! - **Death** -- sweep every living entry whose death time has passed.
//! - **Reproduction** -- a living female of mating age picks a father and
//!   conceives a child born at the current time; she then schedules her next
//!   attempt whether or not a father was found.
//!
//! The run ends when the next event lies past the horizon or the queue runs
//! dry. [`Simulation::run`] then consumes the engine into a
//! [`SimulationOutcome`] holding the frozen registry and the final living
//! population of each sex, ready for coalescence analysis.

use pedigree_queue::PriorityQueue;
use pedigree_types::{
    Ancestor, Event, EventKind, MatingWindows, PersonId, PopulationSample, Sex,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::age::{AgeModel, AgeSampler};
use crate::config::{RunParameters, SamplingConfig, SimulationConfig};
use crate::error::SimulationError;
use crate::mating::MatingContext;
use crate::population::{LivingEntry, LivingPopulation};
use crate::registry::{Registry, RegistryError};

/// What a single call to [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An event of this kind was processed.
    Processed(EventKind),
    /// The next event lies past the horizon; the run is over.
    HorizonReached,
    /// No events remain; the population is extinct.
    Exhausted,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationEndReason {
    /// The clock passed the horizon.
    HorizonReached,
    /// The event queue emptied before the horizon.
    Extinction,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Birth events processed (founders included).
    pub births: u64,
    /// Reproduction events processed.
    pub reproductions: u64,
    /// Death events processed.
    pub death_events: u64,
    /// Living entries removed by death sweeps.
    pub deaths: u64,
    /// Children conceived.
    pub children: u64,
    /// Reproduction attempts by a female of mating age that found no father.
    pub failed_matings: u64,
}

impl RunStats {
    /// Total events processed.
    pub const fn events_processed(&self) -> u64 {
        self.births
            .saturating_add(self.reproductions)
            .saturating_add(self.death_events)
    }

    const fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::Birth => self.births = self.births.saturating_add(1),
            EventKind::Reproduction => self.reproductions = self.reproductions.saturating_add(1),
            EventKind::Death => self.death_events = self.death_events.saturating_add(1),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Population size samples in time order; the last one is stamped at the
    /// horizon.
    pub samples: Vec<PopulationSample>,
    /// Every person ever created.
    pub registry: Registry,
    /// Snapshots of the males alive at the horizon.
    pub males: Vec<Ancestor>,
    /// Snapshots of the females alive at the horizon.
    pub females: Vec<Ancestor>,
    /// Run counters.
    pub stats: RunStats,
    /// Time of the last event taken from the queue.
    pub final_clock: f64,
    /// The horizon the run was bounded by.
    pub horizon: f64,
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
}

impl SimulationOutcome {
    /// Final living population of one sex.
    pub fn population(&self, sex: Sex) -> &[Ancestor] {
        match sex {
            Sex::Female => &self.females,
            Sex::Male => &self.males,
        }
    }

    /// Number of people alive at the horizon.
    pub fn final_size(&self) -> usize {
        self.males.len().saturating_add(self.females.len())
    }
}

/// The population engine.
///
/// Generic over the random source and the age sampler so that tests can
/// seed a [`rand::rngs::SmallRng`] and substitute a deterministic sampler.
#[derive(Debug)]
pub struct Simulation<R, A = AgeModel> {
    age_model: A,
    rng: R,
    registry: Registry,
    events: PriorityQueue<Event>,
    living: LivingPopulation,
    windows: MatingWindows,
    fidelity: f64,
    reproduction_rate: f64,
    sampling: SamplingConfig,
    next_sample: f64,
    samples: Vec<PopulationSample>,
    clock: f64,
    next_sequence: u64,
    stats: RunStats,
}

impl<R: Rng> Simulation<R, AgeModel> {
    /// Build an engine using the Gompertz-Makeham model from `config`.
    ///
    /// # Errors
    ///
    /// See [`Simulation::new`].
    pub fn from_config(config: &SimulationConfig, rng: R) -> Result<Self, SimulationError> {
        let age_model = AgeModel::from_config(&config.age_model)?;
        Self::new(config, age_model, rng)
    }
}

impl<R: Rng, A: AgeSampler> Simulation<R, A> {
    /// Build an engine with an explicit age sampler.
    ///
    /// The reproduction rate is calibrated so that a female who survives her
    /// whole fertile window expects `reproduction.expected_offspring`
    /// attempts: `r = expected_offspring / expected_fertile_span`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if the configuration is invalid,
    /// [`SimulationError::Queue`] for a bad arity, or
    /// [`SimulationError::Calibration`] if the fertile span is not positive.
    pub fn new(config: &SimulationConfig, age_model: A, rng: R) -> Result<Self, SimulationError> {
        config.validate()?;

        let female = config.mating.female;
        let span = age_model.expected_fertile_span(female.min_age, female.max_age);
        let reproduction_rate = config.reproduction.expected_offspring / span;
        if !(reproduction_rate.is_finite() && reproduction_rate > 0.0) {
            return Err(SimulationError::Calibration {
                reason: format!(
                    "expected fertile span over [{}, {}] is {span}",
                    female.min_age, female.max_age
                ),
            });
        }

        let arity = config.queue.arity;
        Ok(Self {
            age_model,
            rng,
            registry: Registry::new(),
            events: PriorityQueue::min(arity, Event::chronological)?,
            living: LivingPopulation::new(arity)?,
            windows: config.mating,
            fidelity: config.reproduction.fidelity,
            reproduction_rate,
            sampling: config.sampling.clone(),
            next_sample: 0.0,
            samples: Vec::new(),
            clock: 0.0,
            next_sequence: 0,
            stats: RunStats::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current clock time.
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Calibrated reproduction attempts per female per year.
    pub const fn reproduction_rate(&self) -> f64 {
        self.reproduction_rate
    }

    /// Every person created so far.
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The living-population heaps.
    pub const fn living(&self) -> &LivingPopulation {
        &self.living
    }

    /// Samples recorded so far.
    pub fn samples(&self) -> &[PopulationSample] {
        &self.samples
    }

    /// Counters so far.
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Number of scheduled events not yet processed.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // -----------------------------------------------------------------------
    // Driving the run
    // -----------------------------------------------------------------------

    /// Create `count` founders of random sex, each with a Birth event at
    /// time 0.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Registry`] if ids are exhausted.
    pub fn seed_founders(&mut self, count: usize) -> Result<(), SimulationError> {
        for _ in 0..count {
            let sex = Sex::random(&mut self.rng);
            self.add_founder(sex)?;
        }
        Ok(())
    }

    /// Create one founder of the given sex with a Birth event at time 0.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Registry`] if ids are exhausted.
    pub fn add_founder(&mut self, sex: Sex) -> Result<PersonId, SimulationError> {
        let id = self.registry.create_founder(sex)?;
        self.schedule(0.0, EventKind::Birth, id);
        Ok(id)
    }

    /// Take the earliest event and process it, unless it lies past
    /// `horizon`.
    ///
    /// # Errors
    ///
    /// Returns an error only on an internal invariant violation (an event
    /// naming an unknown person, a death time set twice, a queue failure).
    pub fn step(&mut self, horizon: f64) -> Result<StepOutcome, SimulationError> {
        if self.events.is_empty() {
            return Ok(StepOutcome::Exhausted);
        }
        let event = self.events.extract_root()?;
        self.clock = event.time;
        if self.clock > horizon {
            return Ok(StepOutcome::HorizonReached);
        }

        self.record_sample_if_due();
        trace!(%event, "Processing event");
        match event.kind {
            EventKind::Birth => self.handle_birth(event.subject)?,
            EventKind::Death => self.handle_death()?,
            EventKind::Reproduction => self.handle_reproduction(event.subject)?,
        }
        self.stats.record(event.kind);
        Ok(StepOutcome::Processed(event.kind))
    }

    /// Seed the founders, process events up to the horizon, and freeze the
    /// result.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`seed_founders`](Self::seed_founders),
    /// [`step`](Self::step) or [`finish`](Self::finish).
    pub fn run(mut self, params: &RunParameters) -> Result<SimulationOutcome, SimulationError> {
        let horizon = params.horizon_time();
        info!(
            founders = params.founders(),
            horizon,
            fidelity = self.fidelity,
            reproduction_rate = self.reproduction_rate,
            sampling_period = self.sampling.period,
            "Simulation starting"
        );

        self.seed_founders(params.founders())?;
        let end_reason = loop {
            match self.step(horizon)? {
                StepOutcome::Processed(_) => {}
                StepOutcome::HorizonReached => break SimulationEndReason::HorizonReached,
                StepOutcome::Exhausted => {
                    warn!(
                        clock = self.clock,
                        horizon,
                        people = self.registry.len(),
                        "Event queue exhausted before the horizon -- extinction"
                    );
                    break SimulationEndReason::Extinction;
                }
            }
        };

        let outcome = self.finish(horizon, end_reason)?;
        info!(
            reason = ?outcome.end_reason,
            final_clock = outcome.final_clock,
            events = outcome.stats.events_processed(),
            people = outcome.registry.len(),
            males = outcome.males.len(),
            females = outcome.females.len(),
            "Simulation ended"
        );
        Ok(outcome)
    }

    /// Sweep everyone dead by `horizon`, record the closing sample at the
    /// horizon, and freeze the engine into an outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Registry`] if a living entry has no record.
    pub fn finish(
        mut self,
        horizon: f64,
        end_reason: SimulationEndReason,
    ) -> Result<SimulationOutcome, SimulationError> {
        let swept = self.living.sweep(horizon)?;
        self.count_deaths(swept);

        let closing = PopulationSample {
            time: horizon,
            size: self.living.size(),
        };
        debug!(time = closing.time, size = closing.size, "Closing population sample");
        self.samples.push(closing);

        let males = self.snapshot(Sex::Male)?;
        let females = self.snapshot(Sex::Female)?;
        Ok(SimulationOutcome {
            samples: self.samples,
            registry: self.registry,
            males,
            females,
            stats: self.stats,
            final_clock: self.clock,
            horizon,
            end_reason,
        })
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn handle_birth(&mut self, id: PersonId) -> Result<(), SimulationError> {
        let person = self.registry.person(id)?;
        let sex = person.sex();
        let lifespan = self.age_model.sample_lifespan(&mut self.rng);
        let death_time = death_after(person.birth_time(), lifespan);

        self.registry.set_death_time(id, death_time)?;
        self.schedule(death_time, EventKind::Death, id);
        if sex.is_female() {
            self.schedule_reproduction(id);
        }
        self.living.insert(sex, LivingEntry::new(id, death_time));
        Ok(())
    }

    fn handle_death(&mut self) -> Result<(), SimulationError> {
        let swept = self.living.sweep(self.clock)?;
        self.count_deaths(swept);
        Ok(())
    }

    fn handle_reproduction(&mut self, mother: PersonId) -> Result<(), SimulationError> {
        let person = self.registry.person(mother)?;
        if !person.is_alive(self.clock) {
            return Ok(());
        }

        if person.is_mating_age(self.clock, &self.windows) {
            let ctx = MatingContext {
                registry: &self.registry,
                males: self.living.males(),
                windows: &self.windows,
                fidelity: self.fidelity,
                time: self.clock,
            };
            match ctx.select_father(mother, &mut self.rng) {
                Some(father) => {
                    self.registry.pair(mother, father)?;
                    let sex = Sex::random(&mut self.rng);
                    let child = self
                        .registry
                        .create_child(sex, self.clock, mother, father)?;
                    self.schedule(self.clock, EventKind::Birth, child);
                    self.stats.children = self.stats.children.saturating_add(1);
                }
                None => {
                    self.stats.failed_matings = self.stats.failed_matings.saturating_add(1);
                }
            }
        }

        self.schedule_reproduction(mother);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn schedule(&mut self, time: f64, kind: EventKind, subject: PersonId) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.events.insert(Event::new(time, kind, subject, sequence));
    }

    fn schedule_reproduction(&mut self, female: PersonId) {
        let wait = self
            .age_model
            .sample_waiting_time(&mut self.rng, self.reproduction_rate);
        self.schedule(self.clock + wait, EventKind::Reproduction, female);
    }

    /// Record `(clock, living size)` once the clock passes the next sampling
    /// threshold, then move the threshold on.
    fn record_sample_if_due(&mut self) {
        if self.clock <= self.next_sample {
            return;
        }
        let sample = PopulationSample {
            time: self.clock,
            size: self.living.size(),
        };
        debug!(time = sample.time, size = sample.size, "Population sample");
        self.samples.push(sample);

        let period = self.sampling.period;
        if self.sampling.catch_up {
            let periods = ((self.clock - self.next_sample) / period).floor() + 1.0;
            self.next_sample = periods.mul_add(period, self.next_sample);
        } else {
            self.next_sample += period;
        }
    }

    fn count_deaths(&mut self, swept: usize) {
        let swept = u64::try_from(swept).unwrap_or(u64::MAX);
        self.stats.deaths = self.stats.deaths.saturating_add(swept);
    }

    fn snapshot(&self, sex: Sex) -> Result<Vec<Ancestor>, RegistryError> {
        self.living
            .members(sex)
            .iter()
            .map(|entry| {
                self.registry
                    .snapshot(entry.id)
                    .ok_or(RegistryError::UnknownPerson { id: entry.id })
            })
            .collect()
    }
}

/// `birth_time + lifespan`, moved up one ulp when the sum rounds back to
/// `birth_time` on a large clock.
const fn death_after(birth_time: f64, lifespan: f64) -> f64 {
    let death_time = birth_time + lifespan;
    if death_time > birth_time {
        death_time
    } else {
        birth_time.next_up()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    /// Deterministic sampler: every lifespan and waiting time is fixed.
    #[derive(Debug, Clone, Copy)]
    struct FixedAges {
        lifespan: f64,
        wait: f64,
        fertile_span: f64,
    }

    impl AgeSampler for FixedAges {
        fn sample_lifespan<R: Rng + ?Sized>(&self, _rng: &mut R) -> f64 {
            self.lifespan
        }

        fn sample_waiting_time<R: Rng + ?Sized>(&self, _rng: &mut R, _rate: f64) -> f64 {
            self.wait
        }

        fn expected_fertile_span(&self, _min_age: f64, _max_age: f64) -> f64 {
            self.fertile_span
        }
    }

    const FIXED: FixedAges = FixedAges {
        lifespan: 70.0,
        wait: 20.0,
        fertile_span: 30.0,
    };

    fn fixed_sim(config: &SimulationConfig) -> Simulation<SmallRng, FixedAges> {
        Simulation::new(config, FIXED, SmallRng::seed_from_u64(42)).unwrap()
    }

    fn run_to(sim: &mut Simulation<SmallRng, FixedAges>, horizon: f64) -> SimulationEndReason {
        loop {
            match sim.step(horizon).unwrap() {
                StepOutcome::Processed(_) => {}
                StepOutcome::HorizonReached => return SimulationEndReason::HorizonReached,
                StepOutcome::Exhausted => return SimulationEndReason::Extinction,
            }
        }
    }

    #[test]
    fn reproduction_rate_is_calibrated_from_fertile_span() {
        let sim = fixed_sim(&SimulationConfig::default());
        assert!((sim.reproduction_rate() - 2.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn zero_fertile_span_fails_calibration() {
        let sampler = FixedAges {
            fertile_span: 0.0,
            ..FIXED
        };
        let result = Simulation::new(
            &SimulationConfig::default(),
            sampler,
            SmallRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(SimulationError::Calibration { .. })));
    }

    #[test]
    fn invalid_config_is_rejected_before_any_state() {
        let mut config = SimulationConfig::default();
        config.reproduction.fidelity = 2.0;
        let result = Simulation::from_config(&config, SmallRng::seed_from_u64(1));
        assert!(matches!(result, Err(SimulationError::Config(_))));
    }

    #[test]
    fn birth_sets_death_and_joins_living_population() {
        let mut sim = fixed_sim(&SimulationConfig::default());
        let mother = sim.add_founder(Sex::Female).unwrap();
        let father = sim.add_founder(Sex::Male).unwrap();

        assert_eq!(sim.step(100.0).unwrap(), StepOutcome::Processed(EventKind::Birth));
        assert_eq!(sim.step(100.0).unwrap(), StepOutcome::Processed(EventKind::Birth));
        assert_eq!(sim.registry().person(mother).unwrap().death_time(), 70.0);
        assert_eq!(sim.registry().person(father).unwrap().death_time(), 70.0);
        assert_eq!(sim.living().size(), 2);
        // Two deaths and one reproduction for the female.
        assert_eq!(sim.pending_events(), 3);
    }

    #[test]
    fn death_always_falls_after_birth() {
        assert_eq!(death_after(10.0, 2.5), 12.5);
        let late = death_after(1.0e6, 1.0e-12);
        assert!(late > 1.0e6);
        assert_eq!(late, 1.0e6_f64.next_up());

        let sampler = FixedAges {
            lifespan: 0.0,
            ..FIXED
        };
        let mut sim = Simulation::new(
            &SimulationConfig::default(),
            sampler,
            SmallRng::seed_from_u64(9),
        )
        .unwrap();
        let founder = sim.add_founder(Sex::Male).unwrap();
        assert_eq!(sim.step(100.0).unwrap(), StepOutcome::Processed(EventKind::Birth));
        assert!(sim.registry().person(founder).unwrap().death_time() > 0.0);
    }

    #[test]
    fn faithful_couple_has_children_together() {
        let mut config = SimulationConfig::default();
        config.reproduction.fidelity = 1.0;
        let mut sim = fixed_sim(&config);
        let mother = sim.add_founder(Sex::Female).unwrap();
        let father = sim.add_founder(Sex::Male).unwrap();

        assert_eq!(run_to(&mut sim, 45.0), SimulationEndReason::HorizonReached);

        let children: Vec<_> = sim
            .registry()
            .iter()
            .filter(|p| p.mother() == Some(mother))
            .collect();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.father() == Some(father)));
        let births: Vec<f64> = children.iter().map(|c| c.birth_time()).collect();
        assert_eq!(births, vec![20.0, 40.0]);
        assert!(sim.registry().is_in_relationship(mother, 45.0));
    }

    #[test]
    fn first_sample_is_taken_when_the_clock_passes_zero() {
        let mut sim = fixed_sim(&SimulationConfig::default());
        sim.add_founder(Sex::Female).unwrap();
        sim.add_founder(Sex::Male).unwrap();
        run_to(&mut sim, 45.0);

        let first = sim.samples().first().copied().unwrap();
        assert_eq!(first, PopulationSample { time: 20.0, size: 2 });
        // Threshold moved to 100; nothing else sampled before 45.
        assert_eq!(sim.samples().len(), 1);
    }

    #[test]
    fn finish_stamps_closing_sample_at_horizon() {
        let mut sim = fixed_sim(&SimulationConfig::default());
        sim.add_founder(Sex::Female).unwrap();
        sim.add_founder(Sex::Male).unwrap();
        let reason = run_to(&mut sim, 45.0);
        let outcome = sim.finish(45.0, reason).unwrap();

        let last = outcome.samples.last().copied().unwrap();
        assert_eq!(last.time, 45.0);
        assert_eq!(last.size, outcome.final_size());
        assert_eq!(outcome.final_clock, 60.0);
        assert_eq!(outcome.end_reason, SimulationEndReason::HorizonReached);
    }

    #[test]
    fn dead_females_stop_reproducing() {
        let mut sim = fixed_sim(&SimulationConfig::default());
        sim.add_founder(Sex::Female).unwrap();

        // Attempts at 20 and 40 find no male, at 60 she is past the window,
        // and the one at 80 finds her dead and is not rescheduled.
        let reason = run_to(&mut sim, 1_000.0);
        assert_eq!(reason, SimulationEndReason::Extinction);
        assert_eq!(sim.stats().reproductions, 4);
        assert_eq!(sim.stats().failed_matings, 2);
        assert_eq!(sim.stats().children, 0);
        assert_eq!(sim.stats().deaths, 1);
        assert_eq!(sim.clock(), 80.0);
        assert_eq!(sim.living().size(), 0);
    }

    #[test]
    fn sampling_threshold_advances_one_period_by_default() {
        let mut sim = fixed_sim(&SimulationConfig::default());
        sim.clock = 350.0;
        sim.record_sample_if_due();
        assert_eq!(sim.next_sample, 100.0);
        sim.record_sample_if_due();
        assert_eq!(sim.next_sample, 200.0);
        assert_eq!(sim.samples().len(), 2);
    }

    #[test]
    fn sampling_catch_up_jumps_past_the_clock() {
        let mut config = SimulationConfig::default();
        config.sampling.catch_up = true;
        let mut sim = fixed_sim(&config);
        sim.clock = 350.0;
        sim.record_sample_if_due();
        assert_eq!(sim.next_sample, 400.0);
        sim.record_sample_if_due();
        assert_eq!(sim.samples().len(), 1);
    }

    #[test]
    fn living_roots_are_alive_after_every_death_sweep() {
        let config = SimulationConfig::default();
        let mut sim = Simulation::from_config(&config, SmallRng::seed_from_u64(2024)).unwrap();
        sim.seed_founders(200).unwrap();

        let mut last_clock = 0.0;
        loop {
            match sim.step(400.0).unwrap() {
                StepOutcome::Processed(kind) => {
                    assert!(sim.clock() >= last_clock, "clock went backward");
                    last_clock = sim.clock();
                    if kind == EventKind::Death {
                        for sex in [Sex::Female, Sex::Male] {
                            if let Some(death) = sim.living().earliest_death(sex) {
                                assert!(death > sim.clock());
                            }
                        }
                    }
                }
                StepOutcome::HorizonReached | StepOutcome::Exhausted => break,
            }
        }
        assert!(sim.stats().death_events > 0);
        assert!(sim.living().heap(Sex::Male).is_heap());
        assert!(sim.living().heap(Sex::Female).is_heap());
    }
}
