//! Plan execution
//!
//! Turns a [`TestPlan`] into a [`Run`] over a [`ShellContext`] and executes
//! it. Every step talks to the outside world through shell commands run in
//! the plan's directory, with the current preferences exported as
//! environment variables.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use crate::common::config::Config;
use crate::common::{excerpt, Error, Result};
use crate::harness::{wait_for_condition, with_timeout, PollOptions, PrefStore};
use crate::runner::{Action, Reporter, Run, RunReport, Scenario};

use super::config::{CommandExpectation, PlanStep, ShellHook, TestPlan};

/// Description of the scenario built from the plan's setup commands
pub const SETUP_DESCRIPTION: &str = "setup";

/// State shared by every step of a plan run
pub struct ShellContext {
    /// Working directory for commands
    pub workdir: PathBuf,
    /// Preferences exported to commands
    pub prefs: PrefStore,
    /// Stdout of the most recent shell step
    pub last_output: String,
    config: Config,
}

impl ShellContext {
    pub fn new(workdir: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            workdir: workdir.into(),
            prefs: PrefStore::new(),
            last_output: String::new(),
            config,
        }
    }

    async fn shell(&self, command: &str) -> Result<Output> {
        TokioCommand::new(&self.config.defaults.shell)
            .arg("-c")
            .arg(command)
            .current_dir(&self.workdir)
            .envs(self.prefs.as_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::command_failed(command, format!("failed to execute: {}", e)))
    }

    fn capture(&mut self, stdout: &[u8]) {
        let limit = self.config.output.max_captured_bytes.min(stdout.len());
        self.last_output = String::from_utf8_lossy(&stdout[..limit]).into_owned();
    }

    fn excerpt(&self, text: &str) -> String {
        excerpt(text, self.config.output.excerpt_chars)
    }
}

/// The steps of one scenario
struct StepsAction {
    steps: Vec<PlanStep>,
}

#[async_trait]
impl Action<ShellContext> for StepsAction {
    async fn run(&self, ctx: &mut ShellContext) -> Result<()> {
        for (i, step) in self.steps.iter().enumerate() {
            let step_num = i + 1;
            debug!(step = step_num, "{}", step.label());
            execute_step(ctx, step).await?;
        }
        Ok(())
    }
}

/// Restores preferences, then runs the plan's finalize commands
struct FinalizeAction {
    hooks: Vec<ShellHook>,
}

#[async_trait]
impl Action<ShellContext> for FinalizeAction {
    async fn run(&self, ctx: &mut ShellContext) -> Result<()> {
        if ctx.prefs.is_dirty() {
            debug!("Restoring preferences changed during the run");
        }
        ctx.prefs.restore();

        // Every hook runs; the first failure is reported
        let mut first_error = None;
        for hook in &self.hooks {
            let expect = CommandExpectation {
                success: Some(true),
                output_contains: None,
            };
            if let Err(e) = execute_shell_step(ctx, &hook.shell, None, Some(&expect)).await {
                warn!(command = %hook.shell, error = %e, "Finalize command failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Build the run for a plan
///
/// Setup commands become a leading scenario so that a failing setup still
/// goes through finalization.
pub fn build_run(plan: TestPlan) -> Run<ShellContext> {
    let mut run = Run::new(plan.name).finalize_with(FinalizeAction {
        hooks: plan.finalize,
    });

    if !plan.setup.is_empty() {
        let steps = plan
            .setup
            .into_iter()
            .map(|hook| PlanStep::Shell {
                command: hook.shell,
                timeout_secs: None,
                expect: None,
            })
            .collect();
        run.push(Scenario::from_action(SETUP_DESCRIPTION, StepsAction { steps }));
    }

    for scenario in plan.scenarios {
        run.push(Scenario::from_action(
            scenario.description,
            StepsAction {
                steps: scenario.steps,
            },
        ));
    }

    run
}

/// Load a plan file and run it
pub async fn run_plan(
    path: &Path,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<RunReport> {
    let plan = TestPlan::load(path)?;

    if let Some(desc) = &plan.description {
        info!(plan = %plan.name, "{}", desc);
    }

    // Relative commands resolve against the plan's directory
    let workdir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Plan prefs are the baseline that reset and restore return to
    let mut ctx = ShellContext::new(workdir, config.clone());
    ctx.prefs = PrefStore::with_values(plan.prefs.clone());

    let run = build_run(plan);
    debug!(run = %run.name(), scenarios = run.len(), "Built run from plan");
    run.execute(&mut ctx, reporter).await
}

/// Execute a single step
async fn execute_step(ctx: &mut ShellContext, step: &PlanStep) -> Result<()> {
    match step {
        PlanStep::Shell {
            command,
            timeout_secs,
            expect,
        } => execute_shell_step(ctx, command, *timeout_secs, expect.as_ref()).await,
        PlanStep::WaitFor {
            command,
            interval_ms,
            max_tries,
            message,
        } => {
            execute_wait_for_step(ctx, command, *interval_ms, *max_tries, message.as_deref())
                .await
        }
        PlanStep::CheckOutput { contains, equals } => {
            execute_check_output_step(ctx, contains.as_deref(), equals.as_deref())
        }
        PlanStep::SetPref { name, value } => {
            ctx.prefs.set(name, value.clone());
            Ok(())
        }
        PlanStep::ResetPref { name } => {
            ctx.prefs.reset(name);
            Ok(())
        }
        PlanStep::Sleep { ms } => {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
            Ok(())
        }
        PlanStep::Info { message } => {
            info!("{}", message);
            Ok(())
        }
    }
}

/// Execute a shell step
async fn execute_shell_step(
    ctx: &mut ShellContext,
    command: &str,
    timeout_secs: Option<u64>,
    expect: Option<&CommandExpectation>,
) -> Result<()> {
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.timeouts.step_timeout());

    let output = with_timeout(timeout, ctx.shell(command)).await?;
    ctx.capture(&output.stdout);

    let should_succeed = expect.and_then(|e| e.success).unwrap_or(true);
    let did_succeed = output.status.success();

    if should_succeed != did_succeed {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::assertion(format!(
            "Command '{}' expected success={}, got success={} (exit code {:?}). Stderr: '{}'",
            command,
            should_succeed,
            did_succeed,
            output.status.code(),
            ctx.excerpt(stderr.trim())
        )));
    }

    if let Some(expected_substr) = expect.and_then(|e| e.output_contains.as_ref()) {
        if !ctx.last_output.contains(expected_substr.as_str()) {
            return Err(Error::assertion(format!(
                "Command '{}' output does not contain '{}'. Got: '{}'",
                command,
                expected_substr,
                ctx.excerpt(&ctx.last_output)
            )));
        }
    }

    Ok(())
}

/// Execute a wait-for step
async fn execute_wait_for_step(
    ctx: &mut ShellContext,
    command: &str,
    interval_ms: Option<u64>,
    max_tries: Option<u32>,
    message: Option<&str>,
) -> Result<()> {
    let defaults = PollOptions::from_timeouts(&ctx.config.timeouts);
    let options = PollOptions::new(
        interval_ms.map(Duration::from_millis).unwrap_or(defaults.interval),
        max_tries.unwrap_or(defaults.max_tries),
    );
    let message = message
        .map(str::to_string)
        .unwrap_or_else(|| format!("'{}' succeeds", command));

    // A hung attempt counts as not met
    let attempt_timeout = ctx.config.timeouts.step_timeout();
    let ctx: &ShellContext = ctx;
    wait_for_condition(
        || async move {
            matches!(
                with_timeout(attempt_timeout, ctx.shell(command)).await,
                Ok(output) if output.status.success()
            )
        },
        &message,
        options,
    )
    .await
}

/// Execute a check output step
fn execute_check_output_step(
    ctx: &ShellContext,
    contains: Option<&str>,
    equals: Option<&str>,
) -> Result<()> {
    let output = ctx.last_output.as_str();

    if let Some(expected_substr) = contains {
        if !output.contains(expected_substr) {
            return Err(Error::assertion(format!(
                "Output does not contain '{}'. Got: '{}'",
                expected_substr,
                ctx.excerpt(output)
            )));
        }
    }

    if let Some(expected_exact) = equals {
        if output.trim() != expected_exact.trim() {
            return Err(Error::assertion(format!(
                "Output mismatch. Expected: '{}', got: '{}'",
                expected_exact,
                ctx.excerpt(output.trim())
            )));
        }
    }

    Ok(())
}
