//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Timeout and polling settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Captured output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Default settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Defaults {
    /// Shell used to run plan commands
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Print step details while running
    #[serde(default)]
    pub verbose: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            verbose: false,
        }
    }
}

fn default_shell() -> String {
    "sh".to_string()
}

/// Timeout settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Timeouts {
    /// Timeout for a single shell step when the plan gives none
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,

    /// Interval between condition checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Number of condition checks before giving up
    #[serde(default = "default_poll_tries")]
    pub poll_max_tries: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            step_timeout_secs: default_step_timeout(),
            poll_interval_ms: default_poll_interval(),
            poll_max_tries: default_poll_tries(),
        }
    }
}

impl Timeouts {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_step_timeout() -> u64 {
    300
}
fn default_poll_interval() -> u64 {
    100
}
fn default_poll_tries() -> u32 {
    50
}

/// Captured output configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Maximum bytes of stdout kept from a shell step
    #[serde(default = "default_max_captured")]
    pub max_captured_bytes: usize,

    /// Characters of output shown in assertion messages
    #[serde(default = "default_excerpt")]
    pub excerpt_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_captured_bytes: default_max_captured(),
            excerpt_chars: default_excerpt(),
        }
    }
}

fn default_max_captured() -> usize {
    1024 * 1024
}
fn default_excerpt() -> usize {
    200
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
