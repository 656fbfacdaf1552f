//! Sequential scenario runner
//!
//! Executes the scenarios of a [`Run`] strictly one after another against a
//! caller-owned context, then runs the finalizer and cleanup hooks exactly
//! once whatever the outcome. The first failing scenario stops the run;
//! its error reaches the caller only after finalization has completed.

mod report;
mod scenario;

pub use report::{
    ConsoleReporter, JsonReporter, OutcomeStatus, Reporter, RunReport, ScenarioOutcome,
    TracingReporter,
};
pub use scenario::{Action, ActionFuture, Run, Scenario};

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use tracing::{debug, info, warn};

use crate::common::{Error, Result};

/// Run `scenarios` in order, then `finalize`
///
/// Shorthand for building a [`Run`] with a single finalizer.
pub async fn run<C, F>(
    scenarios: Vec<Scenario<C>>,
    finalize: F,
    ctx: &mut C,
    reporter: &mut dyn Reporter,
) -> Result<RunReport>
where
    C: Send,
    F: for<'a> Fn(&'a mut C) -> ActionFuture<'a> + Send + Sync + 'static,
{
    let mut run = Run::new("run").finalize(finalize);
    for scenario in scenarios {
        run.push(scenario);
    }
    run.execute(ctx, reporter).await
}

impl<C: Send> Run<C> {
    /// Execute the run
    ///
    /// Returns the report when every scenario and every finalization hook
    /// succeeded. A scenario failure is returned as
    /// [`Error::ScenarioFailed`]; when all scenarios passed but a
    /// finalization hook failed, the first such error is returned as
    /// [`Error::FinalizeFailed`]. The reporter sees the full report in
    /// both cases.
    pub async fn execute(self, ctx: &mut C, reporter: &mut dyn Reporter) -> Result<RunReport> {
        let Run {
            name,
            scenarios,
            finalize,
            cleanups,
            after_each,
        } = self;

        let total = scenarios.len();
        let mut report = RunReport::new(&name, total);

        info!(run = %name, scenarios = total, "Starting run");
        reporter.run_started(&name, total);

        let mut failure = None;

        for (index, scenario) in scenarios.into_iter().enumerate() {
            let Scenario {
                description,
                action,
            } = scenario;

            info!(index, "{}", description);
            reporter.scenario_started(index, &description);

            let started = Instant::now();
            let mut result = settle(action.run(ctx)).await;
            if result.is_ok() {
                if let Some(check) = &after_each {
                    result = settle(check.run(ctx)).await;
                }
            }
            let elapsed = started.elapsed();
            report.scenarios_run += 1;

            match result {
                Ok(()) => {
                    let outcome = ScenarioOutcome::passed(index, &description, elapsed);
                    reporter.scenario_passed(&outcome);
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(index, description = %description, error = %e, "Scenario failed");
                    let outcome = ScenarioOutcome::failed(index, &description, elapsed, &e);
                    reporter.scenario_failed(&outcome, &e);
                    report.outcomes.push(outcome);
                    failure = Some(Error::scenario_failed(index, &description, e));
                    break;
                }
            }
        }

        // Finalizer first, then cleanups in reverse registration order
        let mut finalize_errors = Vec::new();
        let hooks = finalize.into_iter().chain(cleanups.into_iter().rev());
        for hook in hooks {
            if let Err(e) = settle(hook.run(ctx)).await {
                warn!(error = %e, "Finalization step failed");
                reporter.finalize_failed(&e);
                finalize_errors.push(e);
            }
        }

        report.finalize_errors = finalize_errors.iter().map(|e| e.to_string()).collect();
        report.passed = failure.is_none() && finalize_errors.is_empty();

        debug!(
            run = %report.name,
            passed = report.passed,
            scenarios_run = report.scenarios_run,
            "Run finished"
        );
        reporter.run_finished(&report);

        if let Some(e) = failure {
            return Err(e);
        }
        match finalize_errors.into_iter().next() {
            Some(e) => Err(Error::FinalizeFailed(Box::new(e))),
            None => Ok(report),
        }
    }
}

/// Await an action, turning a panic into an error
async fn settle<F>(action: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(action).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Error::ScenarioPanicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
