//! Typed metadata values and their string-coerced storage form.
//!
//! The backend's filter language only compares strings, so every value is
//! coerced to a string exactly once, when a record crosses into storage.
//! Booleans become `"True"` / `"False"` (with a warning, since equality
//! filters on them are easy to get wrong); numbers use their canonical
//! decimal form.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

/// A single metadata value as accepted at the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl MetadataValue {
    /// Coerce to the stored string form.
    ///
    /// `key` is only used for the boolean-coercion warning.
    fn into_stored(self, key: &str) -> String {
        match self {
            MetadataValue::String(s) => s,
            MetadataValue::Integer(i) => i.to_string(),
            MetadataValue::Float(f) => f.to_string(),
            MetadataValue::Bool(b) => {
                warn!(field = key, "boolean metadata value coerced to string");
                if b { "True".to_string() } else { "False".to_string() }
            }
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Metadata attached to a memory: an ordered map of string keys to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

/// Stored (string-coerced) form of metadata, as persisted by backends.
pub type StoredMetadata = BTreeMap<String, String>;

impl Metadata {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Chainable insert, for building metadata inline.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    /// Coerce every value to its stored string form.
    ///
    /// This is the single point where boolean values are stringified.
    pub fn into_stored(self) -> StoredMetadata {
        self.0
            .into_iter()
            .map(|(key, value)| {
                let stored = value.into_stored(&key);
                (key, stored)
            })
            .collect()
    }
}

impl FromIterator<(String, MetadataValue)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, MetadataValue)>>(iter: T) -> Self {
        Metadata(iter.into_iter().collect())
    }
}
