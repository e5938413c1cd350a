//! Backend contract for vector-collection stores.
//!
//! The memory store is a thin orchestration layer; everything that touches
//! vectors or disks lives behind [`VectorBackend`]. The bundled
//! implementation is [`SqliteStore`](crate::sqlite::SqliteStore); anything
//! speaking the same contract (a remote vector database client, an
//! in-memory test double) drops in unchanged.

use crate::errors::Error;
use crate::filter::{Where, WhereDocument};
use crate::memory_types::Memory;
use crate::metadata::StoredMetadata;

/// One record to insert or overwrite.
///
/// `metadata` is already string-coerced; `embedding` is optional — the
/// backend embeds `document` itself when absent.
#[derive(Debug, Clone)]
pub struct UpsertItem {
    pub id: String,
    pub document: String,
    pub metadata: StoredMetadata,
    pub embedding: Option<Vec<f32>>,
}

/// Which optional fields to materialize in results.
#[derive(Debug, Clone, Copy)]
pub struct Include {
    pub embeddings: bool,
    pub distances: bool,
}

impl Include {
    pub const NONE: Include = Include {
        embeddings: false,
        distances: false,
    };
}

/// Parameters for a non-vector fetch.
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    /// Restrict to these ids; `None` means all.
    pub ids: Option<Vec<String>>,
    pub filter: Option<Where>,
    pub document_filter: Option<WhereDocument>,
    /// Maximum number of rows; `None` means all.
    pub limit: Option<usize>,
    pub include_embeddings: bool,
}

/// A named-collection vector store.
///
/// Collections are identified by name. Record ids are unique within a
/// collection; `upsert` with an existing id overwrites. Concurrency
/// control, durability, and nearest-neighbor mechanics are the backend's
/// concern.
pub trait VectorBackend: Send {
    /// Create the collection if it does not exist yet.
    fn ensure_collection(&self, name: &str) -> Result<(), Error>;

    /// Whether the collection exists.
    fn has_collection(&self, name: &str) -> Result<bool, Error>;

    /// Drop a collection and its records. Returns `false` if it was absent.
    fn delete_collection(&self, name: &str) -> Result<bool, Error>;

    /// Names of all collections.
    fn list_collections(&self) -> Result<Vec<String>, Error>;

    /// Number of records in the collection (0 when absent).
    fn count(&self, collection: &str) -> Result<usize, Error>;

    /// Insert or overwrite records. Creates the collection on demand.
    fn upsert(&self, collection: &str, items: Vec<UpsertItem>) -> Result<(), Error>;

    /// Nearest-neighbor query by text; the backend computes the query
    /// embedding. Results are ordered by non-decreasing distance and
    /// at most `n_results` long.
    fn query(
        &self,
        collection: &str,
        query_text: &str,
        n_results: usize,
        filter: Option<&Where>,
        document_filter: Option<&WhereDocument>,
        include: Include,
    ) -> Result<Vec<Memory>, Error>;

    /// Plain fetch by ids and/or filters, without a vector query.
    fn get(&self, collection: &str, request: &GetRequest) -> Result<Vec<Memory>, Error>;

    /// Patch a record's document and/or merge metadata keys. Returns
    /// `false` if the id does not exist. A new document is re-embedded.
    fn update(
        &self,
        collection: &str,
        id: &str,
        document: Option<&str>,
        metadata: Option<&StoredMetadata>,
    ) -> Result<bool, Error>;

    /// Delete records by id. Returns the number actually removed.
    fn delete(&self, collection: &str, ids: &[String]) -> Result<usize, Error>;
}
