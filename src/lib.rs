//! Scenario runner - sequential async scenarios with guaranteed finalization
//!
//! Scenarios run strictly one after another against an explicit context.
//! The first failing scenario stops the run, and the finalizer plus any
//! registered cleanup hooks always run exactly once before the outcome is
//! returned.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod plan;
pub mod runner;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use runner::{Action, ActionFuture, Reporter, Run, RunReport, Scenario};
