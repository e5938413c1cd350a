//! Nearest-neighbor queries over the SQLite store.

use tracing::debug;

use crate::backend::Include;
use crate::errors::Error;
use crate::filter::{Where, WhereDocument};
use crate::memory_types::Memory;

use super::{SqliteStore, blob, blob_to_vec};

impl SqliteStore {
    /// Brute-force cosine scan: embed the query text, score every record
    /// in the collection that passes the filters, sort by ascending
    /// distance, and keep the top `n_results`.
    pub(crate) fn query_impl(
        &self,
        collection: &str,
        query_text: &str,
        n_results: usize,
        filter: Option<&Where>,
        document_filter: Option<&WhereDocument>,
        include: Include,
    ) -> Result<Vec<Memory>, Error> {
        let query_embedding = self.embedder().embed(query_text)?;
        let dims = self.embedder().dims();

        let mut memories = Vec::new();
        for (id, document, metadata, embedding_blob) in self.load_rows(collection)? {
            if let Some(filter) = filter {
                if !filter.matches(&metadata) {
                    continue;
                }
            }
            if let Some(doc_filter) = document_filter {
                if !doc_filter.matches(&document) {
                    continue;
                }
            }

            let embedding = blob_to_vec(&embedding_blob, dims)?;
            let similarity = blob::cosine_similarity(&query_embedding, &embedding)?;
            let distance = blob::cosine_distance(similarity);

            memories.push(Memory {
                id,
                document,
                metadata,
                distance: Some(distance),
                embedding: include.embeddings.then_some(embedding),
            });
        }

        memories.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        memories.truncate(n_results);

        if !include.distances {
            for memory in &mut memories {
                memory.distance = None;
            }
        }

        debug!(
            collection,
            results = memories.len(),
            "nearest-neighbor query"
        );
        Ok(memories)
    }
}
