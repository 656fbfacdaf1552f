//! Common utilities shared by the runner, plans and CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Shorten text for assertion messages, keeping whole characters
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
