//! CRUD operations for the memory store.

use tracing::{debug, warn};

use crate::backend::{GetRequest, UpsertItem};
use crate::errors::Error;
use crate::filter::Where;
use crate::memory_types::{CreateOptions, Memory, SearchOptions, UniqueOutcome};
use crate::metadata::Metadata;

use super::store::{MemoryStore, timestamp};

impl MemoryStore {
    /// Create a new memory in a category, assigning a sequential id.
    ///
    /// Stamps `created_at` / `updated_at` into the metadata. The id is
    /// the pre-insert record count, zero-padded to 16 digits, so ids are
    /// strictly increasing for a single writer. (Two concurrent writers
    /// can race between the count read and the insert; inject explicit
    /// ids via [`create_with`](Self::create_with) if that matters.)
    ///
    /// Returns the assigned id.
    pub fn create(&self, category: &str, text: &str, metadata: Metadata) -> Result<String, Error> {
        self.create_with(category, text, metadata, CreateOptions::default())
    }

    /// Create a memory with an explicit id and/or precomputed embedding.
    ///
    /// Upsert semantics: an existing id is overwritten, no uniqueness
    /// check is performed.
    pub fn create_with(
        &self,
        category: &str,
        text: &str,
        metadata: Metadata,
        options: CreateOptions,
    ) -> Result<String, Error> {
        self.backend.ensure_collection(category)?;

        let now = timestamp();
        let metadata = metadata.with("created_at", now).with("updated_at", now);

        let id = match options.id {
            Some(id) => id,
            None => format!("{:016}", self.backend.count(category)?),
        };

        self.backend.upsert(
            category,
            vec![UpsertItem {
                id: id.clone(),
                document: text.to_string(),
                metadata: metadata.into_stored(),
                embedding: options.embedding,
            }],
        )?;

        debug!(category, id, "created memory");
        Ok(id)
    }

    /// Create a memory unless a very similar unique one already exists.
    ///
    /// Searches the category for one memory flagged `unique="True"`
    /// within distance `1 - similarity` of `content`. When none is
    /// found the new memory is stored flagged `unique="True"`; otherwise
    /// it is stored anyway, flagged `unique="False"` with `related_to` /
    /// `related_document` pointing at the match. The insert is never
    /// rejected.
    pub fn create_unique(
        &self,
        category: &str,
        content: &str,
        metadata: Metadata,
        similarity: f64,
    ) -> Result<UniqueOutcome, Error> {
        let max_distance = 1.0 - similarity;

        let matches = self.search(
            category,
            content,
            SearchOptions {
                n_results: 1,
                min_distance: Some(0.0),
                max_distance: Some(max_distance),
                filter_metadata: Some(Metadata::new().with("unique", "True")),
                ..SearchOptions::default()
            },
        )?;

        match matches.into_iter().next() {
            None => {
                let id = self.create(category, content, metadata.with("unique", "True"))?;
                Ok(UniqueOutcome::Unique { id })
            }
            Some(existing) => {
                let metadata = metadata
                    .with("unique", "False")
                    .with("related_to", existing.id.clone())
                    .with("related_document", existing.document.clone());
                let id = self.create(category, content, metadata)?;
                Ok(UniqueOutcome::Related {
                    id,
                    related_to: existing.id,
                    related_document: existing.document,
                })
            }
        }
    }

    /// Retrieve a memory by id. Returns `None` (with a warning log) if
    /// it does not exist.
    pub fn get(
        &self,
        category: &str,
        id: &str,
        include_embeddings: bool,
    ) -> Result<Option<Memory>, Error> {
        self.backend.ensure_collection(category)?;

        let request = GetRequest {
            ids: Some(vec![id.to_string()]),
            limit: Some(1),
            include_embeddings,
            ..GetRequest::default()
        };
        let mut found = self.backend.get(category, &request)?;

        if found.is_empty() {
            warn!(category, id, "memory not found");
            return Ok(None);
        }
        Ok(Some(found.remove(0)))
    }

    /// Update a memory's text and/or metadata. The id never changes;
    /// metadata keys merge over the existing map and `updated_at` is
    /// stamped.
    ///
    /// Returns `false` (with a warning log) when the id does not exist.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if both `text` and `metadata` are absent.
    pub fn update(
        &self,
        category: &str,
        id: &str,
        text: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<bool, Error> {
        if text.is_none() && metadata.is_none() {
            return Err(Error::InvalidArgument(
                "update requires text or metadata".to_string(),
            ));
        }
        self.backend.ensure_collection(category)?;

        let metadata = metadata
            .unwrap_or_default()
            .with("updated_at", timestamp())
            .into_stored();

        let updated = self.backend.update(category, id, text, Some(&metadata))?;
        if updated {
            debug!(category, id, "updated memory");
        } else {
            warn!(category, id, "tried to update a missing memory");
        }
        Ok(updated)
    }

    /// Delete a memory by id. Idempotent: a missing id is a no-op that
    /// returns `false` with a warning log.
    pub fn delete(&self, category: &str, id: &str) -> Result<bool, Error> {
        self.backend.ensure_collection(category)?;

        if !self.exists(category, id, None)? {
            warn!(category, id, "tried to delete a missing memory");
            return Ok(false);
        }
        let removed = self.backend.delete(category, &[id.to_string()])?;
        debug!(category, id, "deleted memory");
        Ok(removed > 0)
    }

    /// Whether a memory with the given id (and optionally matching
    /// metadata) exists.
    pub fn exists(
        &self,
        category: &str,
        id: &str,
        filter_metadata: Option<&Metadata>,
    ) -> Result<bool, Error> {
        self.backend.ensure_collection(category)?;

        let request = GetRequest {
            ids: Some(vec![id.to_string()]),
            filter: filter_metadata.and_then(Where::from_metadata),
            limit: Some(1),
            include_embeddings: false,
            ..GetRequest::default()
        };
        Ok(!self.backend.get(category, &request)?.is_empty())
    }

    /// Count the memories in a category, or only those flagged
    /// `unique="True"`.
    pub fn count(&self, category: &str, unique: bool) -> Result<usize, Error> {
        self.backend.ensure_collection(category)?;

        if unique {
            let request = GetRequest {
                filter: Some(Where::eq("unique", "True")),
                include_embeddings: false,
                ..GetRequest::default()
            };
            Ok(self.backend.get(category, &request)?.len())
        } else {
            self.backend.count(category)
        }
    }

    /// Delete an entire category. Returns `false` (with a warning log)
    /// when the category does not exist.
    pub fn wipe_category(&self, category: &str) -> Result<bool, Error> {
        let removed = self.backend.delete_collection(category)?;
        if removed {
            debug!(category, "wiped category");
        } else {
            warn!(category, "tried to wipe a missing category");
        }
        Ok(removed)
    }

    /// Delete every category in the store. Returns how many were wiped.
    pub fn wipe_all(&self) -> Result<usize, Error> {
        let mut wiped = 0;
        for name in self.backend.list_collections()? {
            if self.backend.delete_collection(&name)? {
                wiped += 1;
            }
        }
        debug!(wiped, "wiped all memories");
        Ok(wiped)
    }
}
