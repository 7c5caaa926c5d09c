//! Command-line arguments: `pedigree-engine <n> <Tmax> [--json]`.

use clap::Parser;
use pedigree_core::{ConfigError, RunParameters};

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Three blocks of `[n = .., t = ..]` lines.
    Console,
    /// A single pretty-printed JSON document.
    Json,
}

/// Pedigree simulation runner
///
/// Grows a population from `n` founders until `Tmax`, then traces the
/// paternal and maternal lines of the survivors back to time 0.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pedigree-engine")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Number of founders born at time 0
    #[arg(value_name = "N", allow_negative_numbers = true)]
    pub founders: i64,

    /// Simulation horizon in years
    #[arg(value_name = "TMAX", allow_negative_numbers = true)]
    pub horizon: i64,

    /// Print the report as JSON instead of console blocks
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Validate the positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `n` or `Tmax` is not positive.
    pub fn run_parameters(&self) -> Result<RunParameters, ConfigError> {
        RunParameters::new(self.founders, self.horizon)
    }

    /// Requested report format.
    pub const fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Console
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("pedigree-engine").chain(args.iter().copied()))
    }

    #[test]
    fn parses_positional_arguments() {
        let cli = parse(&["1000", "2000"]).unwrap();
        let params = cli.run_parameters().unwrap();
        assert_eq!(params.founders(), 1000);
        assert_eq!(params.horizon(), 2000);
        assert_eq!(cli.format(), OutputFormat::Console);
    }

    #[test]
    fn json_flag_may_appear_anywhere() {
        let cli = parse(&["--json", "10", "20"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Json);
        let cli = parse(&["10", "20", "--json"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Json);
        assert_eq!(cli.run_parameters().unwrap().founders(), 10);
    }

    #[test]
    fn malformed_command_lines_are_rejected() {
        assert_eq!(
            parse(&["10"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["1", "2", "3"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["1", "2", "--xml"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["ten", "100"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
    }

    #[test]
    fn non_positive_values_are_config_errors() {
        let cli = parse(&["0", "100"]).unwrap();
        assert!(matches!(
            cli.run_parameters(),
            Err(ConfigError::Invalid { .. })
        ));
        let cli = parse(&["10", "-5"]).unwrap();
        assert_eq!(cli.horizon, -5);
        assert!(matches!(
            cli.run_parameters(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
