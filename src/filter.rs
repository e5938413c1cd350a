//! Filter expressions for metadata and document matching.
//!
//! The backend query language is deliberately small: per-field equality,
//! conjunction, and document substring containment. `Where` and
//! `WhereDocument` are the typed forms; both serialize to the
//! conventional JSON shape (`{"field": {"$eq": "v"}}`, `{"$and": [...]}`,
//! `{"$contains": "text"}`) for logging and interop.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::metadata::{Metadata, StoredMetadata};

/// Metadata filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Field equals value (stored string comparison).
    Eq { field: String, value: String },
    /// All sub-expressions must hold.
    And(Vec<Where>),
}

impl Where {
    /// Single-field equality.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Where::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a filter from a flat metadata map: one key becomes a plain
    /// equality clause, several keys become a conjunction of them.
    ///
    /// Returns `None` for an empty map.
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        let mut clauses: Vec<Where> = metadata
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    crate::metadata::MetadataValue::String(s) => s.clone(),
                    crate::metadata::MetadataValue::Integer(i) => i.to_string(),
                    crate::metadata::MetadataValue::Float(f) => f.to_string(),
                    crate::metadata::MetadataValue::Bool(b) => {
                        if *b { "True".to_string() } else { "False".to_string() }
                    }
                };
                Where::eq(key.clone(), value)
            })
            .collect();

        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Where::And(clauses)),
        }
    }

    /// Add another equality clause, flattening nested conjunctions.
    #[must_use]
    pub fn and_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let clause = Where::eq(field, value);
        match self {
            Where::And(mut clauses) => {
                clauses.push(clause);
                Where::And(clauses)
            }
            other => Where::And(vec![other, clause]),
        }
    }

    /// Combine an optional base filter with an extra equality clause.
    pub fn with_clause(
        base: Option<Where>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Where {
        match base {
            Some(filter) => filter.and_eq(field, value),
            None => Where::eq(field, value),
        }
    }

    /// Evaluate the expression against stored metadata.
    pub fn matches(&self, metadata: &StoredMetadata) -> bool {
        match self {
            Where::Eq { field, value } => {
                metadata.get(field).is_some_and(|stored| stored == value)
            }
            Where::And(clauses) => clauses.iter().all(|clause| clause.matches(metadata)),
        }
    }
}

impl Serialize for Where {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Where::Eq { field, value } => {
                // {"field": {"$eq": "value"}}
                #[derive(Serialize)]
                struct EqClause<'a> {
                    #[serde(rename = "$eq")]
                    eq: &'a str,
                }
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, &EqClause { eq: value })?;
                map.end()
            }
            Where::And(clauses) => {
                // {"$and": [...]}
                struct Clauses<'a>(&'a [Where]);
                impl Serialize for Clauses<'_> {
                    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                        for clause in self.0 {
                            seq.serialize_element(clause)?;
                        }
                        seq.end()
                    }
                }
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$and", &Clauses(clauses))?;
                map.end()
            }
        }
    }
}

/// Document body filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereDocument {
    /// Document must contain the given substring.
    Contains(String),
}

impl WhereDocument {
    pub fn matches(&self, document: &str) -> bool {
        match self {
            WhereDocument::Contains(text) => document.contains(text.as_str()),
        }
    }
}

impl Serialize for WhereDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WhereDocument::Contains(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$contains", text)?;
                map.end()
            }
        }
    }
}
