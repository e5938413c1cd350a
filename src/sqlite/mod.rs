//! SQLite-backed vector-collection store.
//!
//! Implements [`VectorBackend`] on a single SQLite file: one row per
//! record, embeddings as little-endian f32 BLOBs, metadata as a JSON
//! object of string values. Nearest-neighbor queries are a brute-force
//! cosine scan over the collection (see `query.rs`), which is plenty for
//! the collection sizes an agent memory sees.

pub mod blob;
mod query;

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::backend::{GetRequest, UpsertItem, VectorBackend};
use crate::embedding::TextEmbedder;
use crate::errors::Error;
use crate::memory_types::Memory;
use crate::metadata::StoredMetadata;

pub use blob::{blob_to_vec, cosine_distance, cosine_similarity, vec_to_blob};

/// SQLite vector store with an injected text embedder.
pub struct SqliteStore {
    conn: Connection,
    embedder: Box<dyn TextEmbedder>,
}

fn create_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            document TEXT NOT NULL,
            metadata TEXT NOT NULL,
            embedding BLOB NOT NULL,
            PRIMARY KEY (collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection);
        "#,
    )?;
    Ok(())
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: &std::path::Path, embedder: Box<dyn TextEmbedder>) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        Ok(Self { conn, embedder })
    }

    /// Open a transient in-memory store (used heavily in tests).
    pub fn open_in_memory(embedder: Box<dyn TextEmbedder>) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Ok(Self { conn, embedder })
    }

    pub(crate) fn embedder(&self) -> &dyn TextEmbedder {
        &*self.embedder
    }

    fn check_dims(&self, embedding: &[f32]) -> Result<(), Error> {
        let expected = self.embedder.dims();
        if embedding.len() != expected {
            return Err(Error::MismatchedDimensions {
                expected,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    /// Load all rows of a collection as (id, document, metadata, embedding
    /// blob) tuples, ordered by id for deterministic output.
    pub(crate) fn load_rows(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, String, StoredMetadata, Vec<u8>)>, Error> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, document, metadata, embedding
            FROM records
            WHERE collection = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (id, document, metadata_json, blob) = row?;
            let metadata: HashMap<String, String> = serde_json::from_str(&metadata_json)?;
            result.push((id, document, metadata.into_iter().collect(), blob));
        }
        Ok(result)
    }
}

impl VectorBackend for SqliteStore {
    fn ensure_collection(&self, name: &str) -> Result<(), Error> {
        self.conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn has_collection(&self, name: &str) -> Result<bool, Error> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM collections WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn delete_collection(&self, name: &str) -> Result<bool, Error> {
        if !self.has_collection(name)? {
            return Ok(false);
        }
        self.conn
            .execute("DELETE FROM records WHERE collection = ?1", [name])?;
        self.conn
            .execute("DELETE FROM collections WHERE name = ?1", [name])?;
        debug!(collection = name, "dropped collection");
        Ok(true)
    }

    fn list_collections(&self) -> Result<Vec<String>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn count(&self, collection: &str) -> Result<usize, Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn upsert(&self, collection: &str, items: Vec<UpsertItem>) -> Result<(), Error> {
        self.ensure_collection(collection)?;

        for item in items {
            let embedding = match item.embedding {
                Some(vector) => {
                    self.check_dims(&vector)?;
                    vector
                }
                None => self.embedder.embed(&item.document)?,
            };
            let metadata_json = serde_json::to_string(&item.metadata)?;

            self.conn.execute(
                r#"
                INSERT INTO records (collection, id, document, metadata, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (collection, id) DO UPDATE SET
                    document = excluded.document,
                    metadata = excluded.metadata,
                    embedding = excluded.embedding
                "#,
                params![
                    collection,
                    &item.id,
                    &item.document,
                    &metadata_json,
                    vec_to_blob(&embedding)
                ],
            )?;
        }
        Ok(())
    }

    fn query(
        &self,
        collection: &str,
        query_text: &str,
        n_results: usize,
        filter: Option<&crate::filter::Where>,
        document_filter: Option<&crate::filter::WhereDocument>,
        include: crate::backend::Include,
    ) -> Result<Vec<Memory>, Error> {
        self.query_impl(
            collection,
            query_text,
            n_results,
            filter,
            document_filter,
            include,
        )
    }

    fn get(&self, collection: &str, request: &GetRequest) -> Result<Vec<Memory>, Error> {
        let id_set: Option<BTreeSet<&str>> = request
            .ids
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());

        let mut memories = Vec::new();
        for (id, document, metadata, blob) in self.load_rows(collection)? {
            if let Some(ids) = &id_set {
                if !ids.contains(id.as_str()) {
                    continue;
                }
            }
            if let Some(filter) = &request.filter {
                if !filter.matches(&metadata) {
                    continue;
                }
            }
            if let Some(doc_filter) = &request.document_filter {
                if !doc_filter.matches(&document) {
                    continue;
                }
            }

            let embedding = if request.include_embeddings {
                Some(blob_to_vec(&blob, self.embedder.dims())?)
            } else {
                None
            };
            memories.push(Memory {
                id,
                document,
                metadata,
                distance: None,
                embedding,
            });

            if let Some(limit) = request.limit {
                if memories.len() >= limit {
                    break;
                }
            }
        }
        Ok(memories)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        document: Option<&str>,
        metadata: Option<&StoredMetadata>,
    ) -> Result<bool, Error> {
        let existing: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT document, metadata FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((old_document, old_metadata_json)) = existing else {
            return Ok(false);
        };

        let new_document = document.unwrap_or(&old_document);

        // Metadata keys merge over the existing map, so stamps like
        // created_at survive partial updates.
        let mut merged: HashMap<String, String> = serde_json::from_str(&old_metadata_json)?;
        if let Some(patch) = metadata {
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
        }
        let metadata_json = serde_json::to_string(&merged)?;

        let embedding = if document.is_some() {
            Some(vec_to_blob(&self.embedder.embed(new_document)?))
        } else {
            None
        };

        match embedding {
            Some(blob) => {
                self.conn.execute(
                    r#"
                    UPDATE records SET document = ?1, metadata = ?2, embedding = ?3
                    WHERE collection = ?4 AND id = ?5
                    "#,
                    params![new_document, &metadata_json, blob, collection, id],
                )?;
            }
            None => {
                self.conn.execute(
                    "UPDATE records SET metadata = ?1 WHERE collection = ?2 AND id = ?3",
                    params![&metadata_json, collection, id],
                )?;
            }
        }
        Ok(true)
    }

    fn delete(&self, collection: &str, ids: &[String]) -> Result<usize, Error> {
        let mut removed = 0;
        for id in ids {
            removed += self.conn.execute(
                "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn test_store() -> SqliteStore {
        let embedder = Box::new(HashingEmbedder::new(64).unwrap());
        SqliteStore::open_in_memory(embedder).unwrap()
    }

    fn item(id: &str, document: &str) -> UpsertItem {
        UpsertItem {
            id: id.to_string(),
            document: document.to_string(),
            metadata: StoredMetadata::new(),
            embedding: None,
        }
    }

    #[test]
    fn test_upsert_creates_collection() {
        let store = test_store();
        store.upsert("books", vec![item("1", "dune")]).unwrap();
        assert!(store.has_collection("books").unwrap());
        assert_eq!(store.count("books").unwrap(), 1);
    }

    #[test]
    fn test_upsert_same_id_overwrites() {
        let store = test_store();
        store.upsert("books", vec![item("1", "first")]).unwrap();
        store.upsert("books", vec![item("1", "second")]).unwrap();

        assert_eq!(store.count("books").unwrap(), 1);
        let rows = store.load_rows("books").unwrap();
        assert_eq!(rows[0].1, "second");
    }

    #[test]
    fn test_upsert_rejects_wrong_dims() {
        let store = test_store();
        let bad = UpsertItem {
            embedding: Some(vec![0.5; 3]),
            ..item("1", "text")
        };
        assert!(matches!(
            store.upsert("books", vec![bad]),
            Err(Error::MismatchedDimensions { .. })
        ));
    }

    #[test]
    fn test_count_missing_collection_is_zero() {
        let store = test_store();
        assert_eq!(store.count("nope").unwrap(), 0);
    }

    #[test]
    fn test_get_by_id() {
        let store = test_store();
        store
            .upsert("books", vec![item("1", "dune"), item("2", "hyperion")])
            .unwrap();

        let request = GetRequest {
            ids: Some(vec!["2".to_string()]),
            ..GetRequest::default()
        };
        let found = store.get("books", &request).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].document, "hyperion");
        assert!(found[0].embedding.is_none());
    }

    #[test]
    fn test_get_includes_embeddings_on_request() {
        let store = test_store();
        store.upsert("books", vec![item("1", "dune")]).unwrap();

        let request = GetRequest {
            include_embeddings: true,
            ..GetRequest::default()
        };
        let found = store.get("books", &request).unwrap();
        assert_eq!(found[0].embedding.as_ref().unwrap().len(), 64);
    }

    #[test]
    fn test_get_respects_limit() {
        let store = test_store();
        let items = (0..5).map(|i| item(&i.to_string(), "doc")).collect();
        store.upsert("books", items).unwrap();

        let request = GetRequest {
            limit: Some(2),
            ..GetRequest::default()
        };
        assert_eq!(store.get("books", &request).unwrap().len(), 2);
    }

    #[test]
    fn test_update_merges_metadata() {
        let store = test_store();
        let with_meta = UpsertItem {
            metadata: StoredMetadata::from([("a".to_string(), "1".to_string())]),
            ..item("1", "dune")
        };
        store.upsert("books", vec![with_meta]).unwrap();

        let patch = StoredMetadata::from([("b".to_string(), "2".to_string())]);
        assert!(store.update("books", "1", None, Some(&patch)).unwrap());

        let rows = store.load_rows("books").unwrap();
        assert_eq!(rows[0].2.get("a").map(String::as_str), Some("1"));
        assert_eq!(rows[0].2.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_update_reembeds_new_document() {
        let store = test_store();
        store.upsert("books", vec![item("1", "old text")]).unwrap();
        let before = store.load_rows("books").unwrap()[0].3.clone();

        assert!(
            store
                .update("books", "1", Some("completely different words"), None)
                .unwrap()
        );
        let after = store.load_rows("books").unwrap()[0].3.clone();
        assert_ne!(before, after);
    }

    #[test]
    fn test_update_missing_returns_false() {
        let store = test_store();
        store.ensure_collection("books").unwrap();
        assert!(!store.update("books", "nope", Some("text"), None).unwrap());
    }

    #[test]
    fn test_delete_counts_removed() {
        let store = test_store();
        store
            .upsert("books", vec![item("1", "a"), item("2", "b")])
            .unwrap();

        let removed = store
            .delete(
                "books",
                &["1".to_string(), "2".to_string(), "ghost".to_string()],
            )
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count("books").unwrap(), 0);
    }

    #[test]
    fn test_delete_collection() {
        let store = test_store();
        store.upsert("books", vec![item("1", "a")]).unwrap();
        store.upsert("films", vec![item("1", "b")]).unwrap();

        assert!(store.delete_collection("books").unwrap());
        assert!(!store.delete_collection("books").unwrap());
        assert_eq!(store.list_collections().unwrap(), vec!["films"]);
        assert_eq!(store.count("books").unwrap(), 0);
    }

    #[test]
    fn test_list_collections_sorted() {
        let store = test_store();
        store.ensure_collection("zebra").unwrap();
        store.ensure_collection("apple").unwrap();
        assert_eq!(store.list_collections().unwrap(), vec!["apple", "zebra"]);
    }

    #[test]
    fn test_persistence_across_reopen() {
        use tempfile::TempDir;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");

        {
            let store =
                SqliteStore::open(&path, Box::new(HashingEmbedder::new(64).unwrap())).unwrap();
            store.upsert("books", vec![item("1", "persistent")]).unwrap();
        }

        {
            let store =
                SqliteStore::open(&path, Box::new(HashingEmbedder::new(64).unwrap())).unwrap();
            assert_eq!(store.count("books").unwrap(), 1);
            let rows = store.load_rows("books").unwrap();
            assert_eq!(rows[0].1, "persistent");
        }
    }
}
