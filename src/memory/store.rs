//! Core memory store struct and construction.

use std::path::Path;

use crate::backend::VectorBackend;
use crate::embedding::HashingEmbedder;
use crate::errors::Error;
use crate::sqlite::SqliteStore;

/// Default similarity threshold for uniqueness checks and
/// similarity-based deletion.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.95;

/// Category-scoped memory store.
///
/// A thin orchestration layer over an injected [`VectorBackend`]: it
/// assigns ids, stamps timestamps, normalizes metadata, builds filter
/// expressions, and post-filters query results. Everything stateful
/// lives in the backend; the store itself holds no caches and performs
/// no locking.
pub struct MemoryStore {
    pub(crate) backend: Box<dyn VectorBackend>,
}

impl MemoryStore {
    /// Wrap an existing backend.
    pub fn new(backend: impl VectorBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Open a SQLite-backed store at `path` with the bundled hashing
    /// embedder at the given dimensionality.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or `dims` is zero.
    pub fn open_sqlite(path: &Path, dims: usize) -> Result<Self, Error> {
        let embedder = Box::new(HashingEmbedder::new(dims)?);
        Ok(Self::new(SqliteStore::open(path, embedder)?))
    }
}

/// Current time as fractional epoch seconds, the stamp format used for
/// `created_at` / `updated_at` metadata.
pub(crate) fn timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
