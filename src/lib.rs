//! muisti - category-scoped semantic memory for AI agents.
//!
//! A thin orchestration layer over a vector-collection backend: memories
//! are text records with string metadata, grouped into named categories,
//! searchable by semantic similarity and metadata filters. All
//! operations are synchronous; not-found conditions are values, not
//! errors.
//!
//! # Example
//!
//! ```no_run
//! use muisti::{MemoryStore, Metadata, SearchOptions};
//!
//! let store = MemoryStore::open_sqlite("memories.db".as_ref(), 384)
//!     .expect("failed to open store");
//!
//! let id = store
//!     .create("notes", "Alice works at Acme", Metadata::new().with("source", "chat"))
//!     .expect("failed to create memory");
//!
//! let results = store
//!     .search("notes", "where does alice work", SearchOptions::default())
//!     .expect("search failed");
//! for memory in results {
//!     println!("{:.2}: {}", memory.distance.unwrap_or(1.0), memory.document);
//! }
//!
//! assert!(store.get("notes", &id, true).unwrap().is_some());
//! ```

pub mod backend;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod filter;
pub mod memory;
pub mod memory_types;
pub mod metadata;
pub mod sqlite;

// Re-export public API
pub use backend::{GetRequest, Include, UpsertItem, VectorBackend};
pub use config::Config;
pub use embedding::{HashingEmbedder, TextEmbedder};
pub use errors::Error;
pub use filter::{Where, WhereDocument};
pub use memory::{DEFAULT_SIMILARITY_THRESHOLD, MemoryStore};
pub use memory_types::{
    CreateOptions, GetOptions, Memory, SearchOptions, SortOrder, UniqueOutcome,
};
pub use metadata::{Metadata, MetadataValue, StoredMetadata};
pub use sqlite::SqliteStore;
