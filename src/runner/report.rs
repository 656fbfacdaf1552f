//! Reporting channel for run progress and results

use std::time::Duration;

use colored::Colorize;
use serde::Serialize;

use crate::common::Error;

/// Status of a settled scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub index: usize,
    pub description: String,
    pub status: OutcomeStatus,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioOutcome {
    pub(crate) fn passed(index: usize, description: &str, elapsed: Duration) -> Self {
        Self {
            index,
            description: description.to_string(),
            status: OutcomeStatus::Passed,
            elapsed_ms: elapsed.as_millis() as u64,
            error: None,
        }
    }

    pub(crate) fn failed(index: usize, description: &str, elapsed: Duration, error: &Error) -> Self {
        Self {
            index,
            description: description.to_string(),
            status: OutcomeStatus::Failed,
            elapsed_ms: elapsed.as_millis() as u64,
            error: Some(error.to_string()),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub passed: bool,
    pub scenarios_run: usize,
    pub scenarios_total: usize,
    pub outcomes: Vec<ScenarioOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub finalize_errors: Vec<String>,
}

impl RunReport {
    pub(crate) fn new(name: &str, total: usize) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            scenarios_run: 0,
            scenarios_total: total,
            outcomes: Vec::new(),
            finalize_errors: Vec::new(),
        }
    }

    /// The outcome of the scenario that stopped the run, if any
    pub fn failure(&self) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| !o.is_passed())
    }
}

/// Observer of run progress
///
/// All methods default to doing nothing. `scenario_failed` is always called
/// before the finalizer runs.
pub trait Reporter: Send {
    fn run_started(&mut self, _name: &str, _total: usize) {}

    fn scenario_started(&mut self, _index: usize, _description: &str) {}

    fn scenario_passed(&mut self, _outcome: &ScenarioOutcome) {}

    fn scenario_failed(&mut self, _outcome: &ScenarioOutcome, _error: &Error) {}

    fn finalize_failed(&mut self, _error: &Error) {}

    fn run_finished(&mut self, _report: &RunReport) {}
}

/// Human-readable colored console output
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn run_started(&mut self, name: &str, total: usize) {
        println!(
            "\n{} {} {}",
            "Running:".blue().bold(),
            name.white().bold(),
            format!("({} scenarios)", total).dimmed()
        );
    }

    fn scenario_started(&mut self, index: usize, description: &str) {
        if self.verbose {
            println!("  {} [{}] {}", "→".cyan(), index + 1, description.dimmed());
        }
    }

    fn scenario_passed(&mut self, outcome: &ScenarioOutcome) {
        println!(
            "  {} [{}] {} {}",
            "✓".green(),
            outcome.index + 1,
            outcome.description,
            format!("({} ms)", outcome.elapsed_ms).dimmed()
        );
    }

    fn scenario_failed(&mut self, outcome: &ScenarioOutcome, error: &Error) {
        println!(
            "  {} [{}] {}: {}",
            "✗".red(),
            outcome.index + 1,
            outcome.description,
            error
        );
    }

    fn finalize_failed(&mut self, error: &Error) {
        println!("  {} finalize: {}", "✗".red(), error);
    }

    fn run_finished(&mut self, report: &RunReport) {
        if report.passed {
            println!("\n{} {}\n", "✓".green().bold(), "Run Passed".green().bold());
        } else {
            println!(
                "\n{} {} {}\n",
                "✗".red().bold(),
                "Run Failed".red().bold(),
                format!(
                    "({}/{} scenarios run)",
                    report.scenarios_run, report.scenarios_total
                )
                .dimmed()
            );
        }
    }
}

/// Structured `tracing` events, no console output of its own
#[derive(Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn run_started(&mut self, name: &str, total: usize) {
        tracing::info!(run = name, total, "run started");
    }

    fn scenario_started(&mut self, index: usize, description: &str) {
        tracing::info!(index, description, "scenario started");
    }

    fn scenario_passed(&mut self, outcome: &ScenarioOutcome) {
        tracing::info!(
            index = outcome.index,
            description = %outcome.description,
            elapsed_ms = outcome.elapsed_ms,
            "scenario passed"
        );
    }

    fn scenario_failed(&mut self, outcome: &ScenarioOutcome, error: &Error) {
        tracing::error!(
            index = outcome.index,
            description = %outcome.description,
            error = %error,
            "scenario failed"
        );
    }

    fn finalize_failed(&mut self, error: &Error) {
        tracing::error!(error = %error, "finalization step failed");
    }

    fn run_finished(&mut self, report: &RunReport) {
        tracing::info!(
            run = %report.name,
            passed = report.passed,
            scenarios_run = report.scenarios_run,
            scenarios_total = report.scenarios_total,
            "run finished"
        );
    }
}

/// Prints the final [`RunReport`] as JSON on stdout
#[derive(Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn run_finished(&mut self, report: &RunReport) {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(error = %e, "failed to serialize run report"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let mut report = RunReport::new("mcb redirects", 2);
        report.scenarios_run = 2;
        report.outcomes.push(ScenarioOutcome::passed(0, "A", Duration::from_millis(3)));
        report.outcomes.push(ScenarioOutcome::failed(
            1,
            "B",
            Duration::from_millis(5),
            &Error::assertion("expected X, got Y"),
        ));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "passed");
        assert!(json["outcomes"][0].get("error").is_none());
        assert_eq!(json["outcomes"][1]["status"], "failed");
        assert_eq!(
            json["outcomes"][1]["error"],
            "Assertion failed: expected X, got Y"
        );
        assert!(json.get("finalize_errors").is_none());
    }

    #[test]
    fn test_failure_finds_first_failed_outcome() {
        let mut report = RunReport::new("r", 2);
        report.outcomes.push(ScenarioOutcome::passed(0, "A", Duration::ZERO));
        assert!(report.failure().is_none());

        report.outcomes.push(ScenarioOutcome::failed(
            1,
            "B",
            Duration::ZERO,
            &Error::Timeout(10),
        ));
        assert_eq!(report.failure().unwrap().description, "B");
    }
}
