//! The run report: console blocks or a JSON document.

use chrono::{DateTime, Utc};
use pedigree_coalescence::Lineages;
use pedigree_core::{RunParameters, RunStats, SimulationConfig, SimulationEndReason};
use pedigree_types::{CoalescencePoint, PopulationSample};
use serde::Serialize;
use uuid::Uuid;

/// Parameters the run was started with.
#[derive(Debug, Clone, Serialize)]
pub struct ReportParameters {
    /// Number of founders.
    pub founders: usize,
    /// Horizon in years.
    pub horizon: u64,
    /// Random seed.
    pub seed: u64,
    /// Probability of staying with a mate.
    pub fidelity: f64,
    /// Target reproductions per female over her fertile span.
    pub expected_offspring: f64,
}

/// Everything printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Inputs.
    pub parameters: ReportParameters,
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
    /// Run counters.
    pub stats: RunStats,
    /// Population size history.
    pub population: Vec<PopulationSample>,
    /// Paternal and maternal coalescence points.
    pub lineages: Lineages,
}

impl RunReport {
    /// Assemble a report for a finished run.
    pub fn new(
        config: &SimulationConfig,
        params: &RunParameters,
        end_reason: SimulationEndReason,
        stats: RunStats,
        population: Vec<PopulationSample>,
        lineages: Lineages,
    ) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            parameters: ReportParameters {
                founders: params.founders(),
                horizon: params.horizon(),
                seed: config.run.seed,
                fidelity: config.reproduction.fidelity,
                expected_offspring: config.reproduction.expected_offspring,
            },
            end_reason,
            stats,
            population,
            lineages,
        }
    }

    /// Render the three console blocks.
    pub fn to_console(&self) -> String {
        let mut out = String::new();
        write_block(
            &mut out,
            "Population History",
            self.population.iter().map(|s| (s.size, s.time)),
        );
        write_block(
            &mut out,
            "Paternal Ancestral Lines",
            self.lineages.paternal.iter().map(point_row),
        );
        write_block(
            &mut out,
            "Maternal Ancestral Lines",
            self.lineages.maternal.iter().map(point_row),
        );
        out
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

const fn point_row(point: &CoalescencePoint) -> (usize, f64) {
    (point.lines, point.time)
}

fn write_block(out: &mut String, title: &str, rows: impl Iterator<Item = (usize, f64)>) {
    out.push_str(&format!("\n---------------- {title} ----------------\n\n"));
    for (n, t) in rows {
        out.push_str(&format!("[n = {n}, t = {t:.1}]\n"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        let params = RunParameters::new(3, 100).unwrap();
        let lineages = Lineages {
            paternal: vec![
                CoalescencePoint { time: 42.5, lines: 1 },
                CoalescencePoint { time: 0.0, lines: 1 },
            ],
            maternal: vec![CoalescencePoint { time: 0.0, lines: 0 }],
        };
        RunReport::new(
            &SimulationConfig::default(),
            &params,
            SimulationEndReason::HorizonReached,
            RunStats::default(),
            vec![PopulationSample { time: 100.0, size: 2 }],
            lineages,
        )
    }

    #[test]
    fn console_has_three_blocks_in_order() {
        let text = report().to_console();
        let history = text.find("Population History").unwrap();
        let paternal = text.find("Paternal Ancestral Lines").unwrap();
        let maternal = text.find("Maternal Ancestral Lines").unwrap();
        assert!(history < paternal && paternal < maternal);
        assert!(text.contains("[n = 2, t = 100.0]"));
        assert!(text.contains("[n = 1, t = 42.5]"));
        assert!(text.contains("[n = 0, t = 0.0]"));
    }

    #[test]
    fn console_rows_are_one_per_line() {
        let text = report().to_console();
        let rows: Vec<&str> = text.lines().filter(|line| line.starts_with("[n = ")).collect();
        assert_eq!(
            rows,
            vec![
                "[n = 2, t = 100.0]",
                "[n = 1, t = 42.5]",
                "[n = 1, t = 0.0]",
                "[n = 0, t = 0.0]",
            ]
        );
        assert!(text.starts_with("\n---------------- Population History ----------------\n\n"));
    }

    #[test]
    fn json_report_carries_parameters_and_sequences() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["parameters"]["founders"], 3);
        assert_eq!(value["parameters"]["seed"], 42);
        assert_eq!(value["end_reason"], "HorizonReached");
        assert_eq!(value["lineages"]["paternal"][0]["lines"], 1);
        assert_eq!(value["population"][0]["size"], 2);
        assert!(value["run_id"].is_string());
    }
}
