//! YAML scenario plans
//!
//! A plan describes a run declaratively: preferences, setup commands,
//! scenarios made of shell-backed steps, and finalize commands. Plans are
//! executed by the sequential runner, so they get the same ordering and
//! finalization guarantees as runs built in code.

mod config;
mod runner;

pub use config::*;
pub use runner::{build_run, run_plan, ShellContext, SETUP_DESCRIPTION};
