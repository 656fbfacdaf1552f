//! Scenario plan configuration types
//!
//! Defines the data structures for deserializing YAML scenario plans.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::{Error, Result};
use crate::harness::PrefValue;

/// A complete scenario plan loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestPlan {
    /// Name of the run
    pub name: String,
    /// Optional description of what the plan verifies
    pub description: Option<String>,
    /// Preferences pushed before setup and restored during finalization
    #[serde(default)]
    pub prefs: BTreeMap<String, PrefValue>,
    /// Commands run as a leading "setup" scenario
    #[serde(default)]
    pub setup: Vec<ShellHook>,
    /// Scenarios in execution order
    pub scenarios: Vec<ScenarioSpec>,
    /// Commands run during finalization, after preferences are restored
    #[serde(default)]
    pub finalize: Vec<ShellHook>,
}

/// A bare shell command used by setup and finalize
#[derive(Deserialize, Debug, Clone)]
pub struct ShellHook {
    pub shell: String,
}

/// One scenario of the plan
#[derive(Deserialize, Debug)]
pub struct ScenarioSpec {
    /// Description reported for this scenario
    pub description: String,
    /// Steps executed in order; the first failing step fails the scenario
    pub steps: Vec<PlanStep>,
}

/// A single step in a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanStep {
    /// Run a shell command and capture its stdout
    Shell {
        command: String,
        /// Timeout in seconds (default from config)
        timeout_secs: Option<u64>,
        /// Expectations for the command result (default: must succeed)
        expect: Option<CommandExpectation>,
    },
    /// Poll a shell command until it exits successfully
    WaitFor {
        command: String,
        interval_ms: Option<u64>,
        max_tries: Option<u32>,
        /// Message used when the condition is never met
        message: Option<String>,
    },
    /// Check the output captured by the last shell step
    CheckOutput {
        /// Expected substring in output
        contains: Option<String>,
        /// Expected output, compared after trimming
        equals: Option<String>,
    },
    /// Change a preference for the rest of the run
    SetPref { name: String, value: PrefValue },
    /// Put one preference back to its original value
    ResetPref { name: String },
    /// Pause for a fixed time
    Sleep { ms: u64 },
    /// Log a message
    Info { message: String },
}

impl PlanStep {
    /// Short label used in logs
    pub fn label(&self) -> String {
        match self {
            PlanStep::Shell { command, .. } => format!("shell: {}", command),
            PlanStep::WaitFor { command, .. } => format!("wait for: {}", command),
            PlanStep::CheckOutput { .. } => "check output".to_string(),
            PlanStep::SetPref { name, value } => format!("set pref {} = {}", name, value),
            PlanStep::ResetPref { name } => format!("reset pref {}", name),
            PlanStep::Sleep { ms } => format!("sleep {} ms", ms),
            PlanStep::Info { message } => format!("info: {}", message),
        }
    }
}

/// Expectations for a shell command result
#[derive(Deserialize, Debug, Clone)]
pub struct CommandExpectation {
    /// Whether the command should succeed
    pub success: Option<bool>,
    /// Substring that should be in stdout
    pub output_contains: Option<String>,
}

impl TestPlan {
    /// Load and validate a plan from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parse and validate a plan; `origin` names the source in errors
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self> {
        let plan: TestPlan = serde_yaml::from_str(content).map_err(|e| Error::PlanParse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        plan.validate().map_err(|reason| Error::PlanParse {
            path: origin.to_string(),
            reason,
        })?;
        Ok(plan)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("plan name is empty".to_string());
        }
        for (i, scenario) in self.scenarios.iter().enumerate() {
            if scenario.description.trim().is_empty() {
                return Err(format!("scenario {} has an empty description", i + 1));
            }
            for step in &scenario.steps {
                if let PlanStep::Shell { command, .. } | PlanStep::WaitFor { command, .. } = step
                {
                    if command.trim().is_empty() {
                        return Err(format!(
                            "scenario '{}' has an empty command",
                            scenario.description
                        ));
                    }
                }
            }
        }
        if self
            .setup
            .iter()
            .chain(&self.finalize)
            .any(|h| h.shell.trim().is_empty())
        {
            return Err("setup/finalize contains an empty command".to_string());
        }
        Ok(())
    }

    /// Scenario descriptions in run order, including the setup scenario
    pub fn descriptions(&self) -> Vec<String> {
        let setup = (!self.setup.is_empty()).then(|| super::runner::SETUP_DESCRIPTION.to_string());
        setup
            .into_iter()
            .chain(self.scenarios.iter().map(|s| s.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MCB_PLAN: &str = r#"
name: mixed content redirects
description: redirected subresources are blocked on https pages
prefs:
  BLOCK_ACTIVE: true
  BLOCK_DISPLAY: true
setup:
  - shell: mkdir -p out
scenarios:
  - description: https page blocks redirected script
    steps:
      - action: shell
        command: cat fixtures/https_script.txt
        expect:
          output_contains: blocked
      - action: check_output
        equals: script blocked
  - description: cached image while offline
    steps:
      - action: set_pref
        name: OFFLINE
        value: true
      - action: wait_for
        command: test -f out/image
        interval_ms: 10
        max_tries: 3
      - action: reset_pref
        name: OFFLINE
      - action: sleep
        ms: 1
      - action: info
        message: back online
finalize:
  - shell: rm -rf out
"#;

    #[test]
    fn test_parse_full_plan() {
        let plan = TestPlan::from_yaml(MCB_PLAN, "mcb.yaml").unwrap();

        assert_eq!(plan.name, "mixed content redirects");
        assert_eq!(plan.prefs["BLOCK_ACTIVE"], PrefValue::Bool(true));
        assert_eq!(plan.setup.len(), 1);
        assert_eq!(plan.scenarios.len(), 2);
        assert_eq!(plan.finalize[0].shell, "rm -rf out");

        let steps = &plan.scenarios[1].steps;
        assert!(matches!(
            &steps[0],
            PlanStep::SetPref { name, value: PrefValue::Bool(true) } if name == "OFFLINE"
        ));
        assert!(matches!(
            &steps[1],
            PlanStep::WaitFor { interval_ms: Some(10), max_tries: Some(3), .. }
        ));
        assert_eq!(steps[4].label(), "info: back online");
    }

    #[test]
    fn test_descriptions_include_setup() {
        let plan = TestPlan::from_yaml(MCB_PLAN, "mcb.yaml").unwrap();
        assert_eq!(
            plan.descriptions(),
            vec![
                "setup",
                "https page blocks redirected script",
                "cached image while offline"
            ]
        );
    }

    #[test]
    fn test_unknown_action_is_parse_error() {
        let yaml = r#"
name: bad
scenarios:
  - description: typo
    steps:
      - action: shel
        command: "true"
"#;
        let err = TestPlan::from_yaml(yaml, "bad.yaml").unwrap_err();
        match err {
            Error::PlanParse { path, .. } => assert_eq!(path, "bad.yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_command_rejected() {
        let yaml = r#"
name: bad
scenarios:
  - description: nothing to run
    steps:
      - action: shell
        command: "  "
"#;
        let err = TestPlan::from_yaml(yaml, "bad.yaml").unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }
}
