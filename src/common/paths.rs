//! Configuration and log file locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/scenario-runner/` and `~/.local/share/scenario-runner/`
//! - macOS: `~/Library/Application Support/scenario-runner/`
//! - Windows: `%APPDATA%\scenario-runner\`

use std::io;
use std::path::PathBuf;

/// Project name used for directory lookups
const APP_NAME: &str = "scenario-runner";

/// Name of the log file inside the log directory
pub(crate) const LOG_FILE: &str = "scenario.log";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("logs"))
}

/// Get the path to the log file
pub fn log_path() -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(LOG_FILE))
}

/// Ensure the log directory exists, returning it
pub fn ensure_log_dir() -> io::Result<Option<PathBuf>> {
    match log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Ok(Some(dir))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().unwrap(), "config.toml");
        }
    }

    #[test]
    fn test_log_path_is_inside_log_dir() {
        if let (Some(dir), Some(file)) = (log_dir(), log_path()) {
            assert_eq!(file.parent().unwrap(), dir.as_path());
        }
    }
}
