//! Scenario CLI - run YAML scenario plans sequentially
//!
//! Each plan is executed scenario by scenario; the first failure stops the
//! run and finalization always happens.

use clap::Parser;
use scenario::{cli, commands};
use commands::Commands;

#[derive(Parser)]
#[command(name = "scenario", about = "Sequential scenario runner")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
