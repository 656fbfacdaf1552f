//! Error types for the scenario runner
//!
//! Messages are meant to be read in a failing test log, so each variant
//! carries enough context to locate the problem without a backtrace.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Scenario Errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Scenario {index} '{description}' failed: {source}")]
    ScenarioFailed {
        index: usize,
        description: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Scenario panicked: {0}")]
    ScenarioPanicked(String),

    #[error("Finalization failed: {0}")]
    FinalizeFailed(#[source] Box<Error>),

    // === Waiting Errors ===
    #[error("Condition not met after {tries} tries: {message}")]
    ConditionTimeout { message: String, tries: u32 },

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    // === Command Errors ===
    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario plan '{path}': {reason}")]
    PlanParse { path: String, reason: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an assertion error from anything displayable
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Wrap an action error with the scenario it came from
    pub fn scenario_failed(index: usize, description: &str, source: Error) -> Self {
        Self::ScenarioFailed {
            index,
            description: description.to_string(),
            source: Box::new(source),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: &str, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// The innermost error for scenario failures, `self` otherwise
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::ScenarioFailed { source, .. } | Self::FinalizeFailed(source) => {
                source.root_cause()
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_failed_message_names_scenario() {
        let err = Error::scenario_failed(1, "B", Error::assertion("expected X, got Y"));
        assert_eq!(
            err.to_string(),
            "Scenario 1 'B' failed: Assertion failed: expected X, got Y"
        );
    }

    #[test]
    fn test_root_cause_unwraps_nested() {
        let err = Error::FinalizeFailed(Box::new(Error::Timeout(50)));
        assert!(matches!(err.root_cause(), Error::Timeout(50)));
    }
}
