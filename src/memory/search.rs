//! Search and listing operations for the memory store.

use tracing::{debug, warn};

use crate::backend::{GetRequest, Include};
use crate::errors::Error;
use crate::filter::{Where, WhereDocument};
use crate::memory_types::{GetOptions, Memory, SearchOptions, SortOrder};

use super::store::MemoryStore;

/// Build the metadata filter shared by search and get_many: the flat
/// filter map plus, when requested, the `unique="True"` clause.
fn build_filter(options_filter: Option<&crate::metadata::Metadata>, unique: bool) -> Option<Where> {
    let filter = options_filter.and_then(Where::from_metadata);
    if unique {
        Some(Where::with_clause(filter, "unique", "True"))
    } else {
        filter
    }
}

impl MemoryStore {
    /// Search a category by semantic similarity.
    ///
    /// Returns at most `n_results` memories ordered nearest first. An
    /// empty category short-circuits to `[]` without touching the
    /// backend's query path. Distance bounds are inclusive and applied
    /// after the query, in the backend's normalized space (0 identical,
    /// 1 maximally dissimilar).
    pub fn search(
        &self,
        category: &str,
        search_text: &str,
        options: SearchOptions,
    ) -> Result<Vec<Memory>, Error> {
        self.backend.ensure_collection(category)?;

        let total = self.backend.count(category)?;
        if total == 0 {
            return Ok(Vec::new());
        }
        let n_results = options.n_results.min(total);

        let filter = build_filter(options.filter_metadata.as_ref(), options.unique);
        let document_filter = options.contains_text.clone().map(WhereDocument::Contains);

        // Distances are always requested: the window filter below needs
        // them even when the caller asked for them to be omitted.
        let include = Include {
            embeddings: options.include_embeddings,
            distances: true,
        };

        let mut results = self.backend.query(
            category,
            search_text,
            n_results,
            filter.as_ref(),
            document_filter.as_ref(),
            include,
        )?;

        if let Some(min) = options.min_distance {
            results.retain(|m| m.distance.is_some_and(|d| d >= min));
        }
        if let Some(max) = options.max_distance {
            results.retain(|m| m.distance.is_some_and(|d| d <= max));
        }
        if !options.include_distances {
            for memory in &mut results {
                memory.distance = None;
            }
        }

        debug!(category, results = results.len(), "searched memory");
        Ok(results)
    }

    /// List memories without a vector query: filter, sort by id
    /// (lexicographically), truncate.
    pub fn get_many(&self, category: &str, options: GetOptions) -> Result<Vec<Memory>, Error> {
        self.backend.ensure_collection(category)?;

        let total = self.backend.count(category)?;
        if total == 0 {
            return Ok(Vec::new());
        }
        let n_results = options.n_results.min(total);

        let request = GetRequest {
            ids: None,
            filter: build_filter(options.filter_metadata.as_ref(), options.unique),
            document_filter: options.contains_text.clone().map(WhereDocument::Contains),
            limit: None,
            include_embeddings: options.include_embeddings,
        };
        let mut memories = self.backend.get(category, &request)?;

        memories.sort_by(|a, b| match options.sort_order {
            SortOrder::Asc => a.id.cmp(&b.id),
            SortOrder::Desc => b.id.cmp(&a.id),
        });
        memories.truncate(n_results);

        debug!(category, results = memories.len(), "listed memories");
        Ok(memories)
    }

    /// Delete the memories most similar to `content`.
    ///
    /// Walks search results nearest first, collecting ids while
    /// similarity (`1 - distance`) exceeds the threshold, and stops at
    /// the first miss — results are distance-sorted, so nothing after it
    /// can qualify. Returns whether anything was deleted.
    pub fn delete_similar(
        &self,
        category: &str,
        content: &str,
        similarity_threshold: f64,
    ) -> Result<bool, Error> {
        let results = self.search(category, content, SearchOptions::default())?;

        let mut ids = Vec::new();
        for memory in results {
            if memory.similarity().unwrap_or(0.0) > similarity_threshold {
                ids.push(memory.id);
            } else {
                break;
            }
        }

        if ids.is_empty() {
            warn!(category, "no similar memories found to delete");
            return Ok(false);
        }

        let removed = self.backend.delete(category, &ids)?;
        debug!(category, removed, "deleted similar memories");
        Ok(removed > 0)
    }
}
