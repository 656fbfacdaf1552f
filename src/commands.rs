//! CLI command definitions
//!
//! Defines the clap commands for the scenario CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a scenario plan defined in a YAML file
    Run {
        /// Path to the YAML plan file
        path: PathBuf,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        /// Print the run report as JSON instead of console output
        #[arg(long)]
        json: bool,

        /// Also write logs to the log file
        #[arg(long)]
        log_file: bool,
    },

    /// List the scenarios of a plan without running them
    #[command(alias = "ls")]
    List {
        /// Path to the YAML plan file
        path: PathBuf,
    },

    /// View the log file
    Logs {
        /// Number of lines to show (default: 50)
        #[arg(long, short = 'n', default_value = "50")]
        lines: usize,

        /// Clear the log file
        #[arg(long)]
        clear: bool,
    },

    /// Show the config file location and effective settings
    Config,
}
