//! Category-scoped memory store over a vector backend.
//!
//! Provides the high-level API: create, search, retrieve, update, delete,
//! and wipe operations for text memories grouped into categories. Each
//! category maps 1:1 to a backend collection and is created lazily on
//! first write.

mod crud;
mod search;

// pub(crate): module internals hidden; public items re-exported explicitly via lib.rs
pub(crate) mod store;

pub use store::{DEFAULT_SIMILARITY_THRESHOLD, MemoryStore};
