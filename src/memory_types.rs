//! Memory record and option types for the store API.

use serde::Serialize;

use crate::metadata::{Metadata, StoredMetadata};

/// A single memory record as returned by store operations.
///
/// `metadata` is the stored (string-coerced) form; `distance` and
/// `embedding` are present depending on the operation and its include
/// flags. Distance is the backend's normalized dissimilarity: 0.0 means
/// identical, 1.0 maximally dissimilar.
#[derive(Debug, Clone, Serialize)]
pub struct Memory {
    pub id: String,
    pub document: String,
    pub metadata: StoredMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Memory {
    /// Similarity (`1 - distance`), when a distance is attached.
    pub fn similarity(&self) -> Option<f64> {
        self.distance.map(|d| 1.0 - d)
    }
}

/// Sort order for [`get_many`](crate::memory::MemoryStore::get_many),
/// applied to ids lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Optional inputs for `create_with`: an explicit id and/or a
/// caller-computed embedding. With neither, ids are assigned sequentially
/// and the backend embeds the document itself.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub id: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

/// Outcome of a uniqueness-checked create. The insert always happens;
/// this only reports whether the record was flagged unique or annotated
/// as related to an existing near-duplicate.
#[derive(Debug, Clone, Serialize)]
pub enum UniqueOutcome {
    /// No sufficiently similar unique memory existed; stored with
    /// `unique="True"`.
    Unique { id: String },
    /// A near-duplicate was found; stored anyway with `unique="False"`
    /// and a pointer to the existing memory.
    Related {
        id: String,
        related_to: String,
        related_document: String,
    },
}

impl UniqueOutcome {
    /// Id of the record that was inserted.
    pub fn id(&self) -> &str {
        match self {
            UniqueOutcome::Unique { id } | UniqueOutcome::Related { id, .. } => id,
        }
    }
}

/// Options for semantic search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum results; clamped to the collection size.
    pub n_results: usize,
    /// Per-key equality constraints on metadata.
    pub filter_metadata: Option<Metadata>,
    /// Substring the document body must contain.
    pub contains_text: Option<String>,
    pub include_embeddings: bool,
    pub include_distances: bool,
    /// Inclusive lower bound on distance.
    pub min_distance: Option<f64>,
    /// Inclusive upper bound on distance.
    pub max_distance: Option<f64>,
    /// Restrict to memories flagged `unique="True"`.
    pub unique: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            n_results: 5,
            filter_metadata: None,
            contains_text: None,
            include_embeddings: true,
            include_distances: true,
            min_distance: None,
            max_distance: None,
            unique: false,
        }
    }
}

/// Options for plain (non-vector) listing.
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub sort_order: SortOrder,
    pub contains_text: Option<String>,
    pub filter_metadata: Option<Metadata>,
    /// Maximum results; clamped to the collection size.
    pub n_results: usize,
    pub include_embeddings: bool,
    /// Restrict to memories flagged `unique="True"`.
    pub unique: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::Desc,
            contains_text: None,
            filter_metadata: None,
            n_results: 20,
            include_embeddings: true,
            unique: false,
        }
    }
}
