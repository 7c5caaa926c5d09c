//! Command-line runner for the pedigree simulation.
//!
//! Runs a population forward from `n` founders until the horizon `Tmax`,
//! traces the paternal and maternal lines of the survivors back in time,
//! and prints the result.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing, to stderr)
//! 2. Parse `n`, `Tmax` and the optional `--json` flag
//! 3. Load configuration from `pedigree-config.yaml`
//! 4. Run the simulation with a seeded random source
//! 5. Analyze both sexes' ancestral lines
//! 6. Print the report to stdout

mod cli;
mod error;
mod report;

use std::path::Path;

use clap::Parser;
use pedigree_coalescence::CoalescenceAnalyzer;
use pedigree_core::{Simulation, SimulationConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, OutputFormat};
use crate::error::EngineError;
use crate::report::RunReport;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "pedigree-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the arguments or configuration are invalid, or if the
/// simulation or analysis hits an internal invariant violation.
#[allow(clippy::print_stdout)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // 2. Parse arguments before touching any simulation state.
    let cli = CliArgs::parse();
    let params = cli.run_parameters().map_err(EngineError::from)?;
    info!(
        founders = params.founders(),
        horizon = params.horizon(),
        "pedigree-engine starting"
    );

    // 3. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.run.seed,
        fidelity = config.reproduction.fidelity,
        expected_offspring = config.reproduction.expected_offspring,
        arity = config.queue.arity,
        "Configuration loaded"
    );

    // 4. Run the simulation.
    let rng = StdRng::seed_from_u64(config.run.seed);
    let simulation = Simulation::from_config(&config, rng).map_err(EngineError::from)?;
    let outcome = simulation.run(&params).map_err(EngineError::from)?;

    // 5. Trace ancestral lines.
    let analyzer = CoalescenceAnalyzer::new(config.queue.arity).map_err(EngineError::from)?;
    let lineages = analyzer
        .analyze_lineages(&outcome.males, &outcome.females, &outcome.registry)
        .map_err(EngineError::from)?;
    info!(
        paternal_points = lineages.paternal.len(),
        maternal_points = lineages.maternal.len(),
        "Coalescence analysis complete"
    );

    // 6. Print the report.
    let report = RunReport::new(
        &config,
        &params,
        outcome.end_reason,
        outcome.stats,
        outcome.samples,
        lineages,
    );
    match cli.format() {
        OutputFormat::Console => print!("{}", report.to_console()),
        OutputFormat::Json => println!("{}", report.to_json().map_err(EngineError::from)?),
    }

    Ok(())
}

/// Load `pedigree-config.yaml`, or defaults if the file does not exist.
///
/// `PEDIGREE_SEED` overrides the seed either way, and the result is
/// validated before it is returned.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    let config = if config_path.exists() {
        SimulationConfig::from_file(config_path)?
    } else {
        info!("Config file not found, using defaults");
        let mut config = SimulationConfig::default();
        config.run.apply_env_overrides()?;
        config
    };
    config.validate()?;
    Ok(config)
}
