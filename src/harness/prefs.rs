//! Preference store with save-and-restore
//!
//! Every key changed through [`PrefStore::set`], [`PrefStore::push`] or
//! [`PrefStore::clear`] has its original value remembered on first touch.
//! [`PrefStore::restore`] puts all of them back.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Int(i) => write!(f, "{}", i),
            PrefValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Int(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PrefStore {
    values: BTreeMap<String, PrefValue>,
    /// Original value per touched key, `None` if the key was absent
    saved: BTreeMap<String, Option<PrefValue>>,
}

impl PrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose initial values count as originals
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PrefValue>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            saved: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PrefValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(PrefValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    fn remember(&mut self, name: &str) {
        if !self.saved.contains_key(name) {
            self.saved
                .insert(name.to_string(), self.values.get(name).cloned());
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<PrefValue>) {
        self.remember(name);
        let value = value.into();
        debug!(pref = name, value = %value, "Setting preference");
        self.values.insert(name.to_string(), value);
    }

    /// Set several preferences at once
    pub fn push<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<PrefValue>,
    {
        for (name, value) in entries {
            self.set(name.as_ref(), value);
        }
    }

    pub fn clear(&mut self, name: &str) {
        self.remember(name);
        self.values.remove(name);
    }

    /// Put one preference back to its original value
    pub fn reset(&mut self, name: &str) {
        match self.saved.remove(name) {
            Some(Some(value)) => {
                self.values.insert(name.to_string(), value);
            }
            Some(None) => {
                self.values.remove(name);
            }
            None => {}
        }
    }

    /// Whether any preference has been touched since the last restore
    pub fn is_dirty(&self) -> bool {
        !self.saved.is_empty()
    }

    /// Put every touched preference back to its original value
    pub fn restore(&mut self) {
        for (name, original) in std::mem::take(&mut self.saved) {
            match original {
                Some(value) => {
                    self.values.insert(name, value);
                }
                None => {
                    self.values.remove(&name);
                }
            }
        }
    }

    /// Render preferences as environment variable pairs
    pub fn as_env(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}
