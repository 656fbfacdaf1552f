//! Collaborators used inside scenario actions

pub mod observer;
pub mod prefs;
pub mod wait;

pub use observer::ObserverLog;
pub use prefs::{PrefStore, PrefValue};
pub use wait::{wait_for_condition, with_timeout, PollOptions};
