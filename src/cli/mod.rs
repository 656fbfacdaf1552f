//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{logging, paths, Error, Result};
use crate::plan::{self, TestPlan};
use crate::runner::{ConsoleReporter, JsonReporter, Reporter};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            path,
            verbose,
            json,
            log_file,
        } => {
            let config = Config::load()?;
            let verbose = verbose || config.defaults.verbose;

            if log_file {
                if let Some(file) = logging::init_with_file(verbose) {
                    tracing::debug!(log_file = %file.display(), "Logging to file");
                }
            } else {
                logging::init_cli(verbose);
            }

            let mut reporter: Box<dyn Reporter> = if json {
                Box::new(JsonReporter)
            } else {
                Box::new(ConsoleReporter::new(verbose))
            };

            plan::run_plan(&path, &config, reporter.as_mut()).await?;
            Ok(())
        }

        Commands::List { path } => {
            let plan = TestPlan::load(&path)?;

            println!("{}", plan.name.white().bold());
            if let Some(desc) = &plan.description {
                println!("  {}", desc.dimmed());
            }
            for (i, description) in plan.descriptions().iter().enumerate() {
                println!("  {:>3}. {}", i + 1, description);
            }
            Ok(())
        }

        Commands::Logs { lines, clear } => {
            let log_path = paths::log_path()
                .ok_or_else(|| Error::Config("Could not determine log directory".to_string()))?;

            if clear {
                logging::truncate_log()?;
                println!("Log file cleared: {}", log_path.display());
                return Ok(());
            }

            if !log_path.exists() {
                println!("No log file at {}", log_path.display());
                println!("Run a plan with --log-file to create one");
                return Ok(());
            }

            let content = std::fs::read_to_string(&log_path).map_err(|e| Error::FileRead {
                path: log_path.display().to_string(),
                error: e.to_string(),
            })?;
            let all: Vec<&str> = content.lines().collect();
            let start = all.len().saturating_sub(lines);
            for line in &all[start..] {
                println!("{}", line);
            }
            Ok(())
        }

        Commands::Config => {
            match paths::config_path() {
                Some(path) if path.exists() => println!("Config file: {}", path.display()),
                Some(path) => println!("Config file: {} (not present, using defaults)", path.display()),
                None => println!("Config file: unavailable on this platform"),
            }

            let config = Config::load()?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| Error::Config(format!("Failed to render config: {}", e)))?;
            println!("\n{}", rendered);
            Ok(())
        }
    }
}
