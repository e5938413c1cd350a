//! End-to-end tests through the public library API.

use muisti::{
    GetOptions, Memory, MemoryStore, Metadata, SearchOptions, SortOrder, UniqueOutcome,
};
use tempfile::TempDir;

const DIMS: usize = 128;

fn open_store(dir: &TempDir) -> MemoryStore {
    let path = dir.path().join("memories.db");
    MemoryStore::open_sqlite(&path, DIMS).unwrap()
}

#[test]
fn test_full_crud_lifecycle() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let id = store
        .create(
            "facts",
            "the capital of finland is helsinki",
            Metadata::new().with("topic", "geography"),
        )
        .unwrap();
    assert_eq!(id, "0000000000000000");

    let memory = store.get("facts", &id, true).unwrap().unwrap();
    assert_eq!(memory.document, "the capital of finland is helsinki");
    assert_eq!(
        memory.metadata.get("topic").map(String::as_str),
        Some("geography")
    );
    assert_eq!(memory.embedding.as_ref().map(Vec::len), Some(DIMS));

    assert!(
        store
            .update(
                "facts",
                &id,
                Some("the capital of finland is helsinki, founded 1550"),
                None,
            )
            .unwrap()
    );
    let memory = store.get("facts", &id, false).unwrap().unwrap();
    assert!(memory.document.contains("1550"));
    // metadata from create survives a text-only update
    assert_eq!(
        memory.metadata.get("topic").map(String::as_str),
        Some("geography")
    );

    assert!(store.delete("facts", &id).unwrap());
    assert!(store.get("facts", &id, false).unwrap().is_none());
    assert_eq!(store.count("facts", false).unwrap(), 0);
}

#[test]
fn test_persistence_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memories.db");

    {
        let store = MemoryStore::open_sqlite(&path, DIMS).unwrap();
        store
            .create("facts", "water boils at one hundred degrees", Metadata::new())
            .unwrap();
    }

    {
        let store = MemoryStore::open_sqlite(&path, DIMS).unwrap();
        assert_eq!(store.count("facts", false).unwrap(), 1);

        let results = store
            .search(
                "facts",
                "water boils at one hundred degrees",
                SearchOptions::default(),
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].distance.unwrap() < 0.01);
    }
}

#[test]
fn test_categories_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .create("work", "quarterly report due friday", Metadata::new())
        .unwrap();
    store
        .create("home", "quarterly report due friday", Metadata::new())
        .unwrap();

    assert_eq!(store.count("work", false).unwrap(), 1);
    assert_eq!(store.count("home", false).unwrap(), 1);

    store.wipe_category("work").unwrap();
    assert_eq!(store.count("work", false).unwrap(), 0);
    assert_eq!(store.count("home", false).unwrap(), 1);
}

#[test]
fn test_search_ranks_by_relevance() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .create("notes", "rust lifetimes and borrowing", Metadata::new())
        .unwrap();
    store
        .create("notes", "baking bread with wild yeast", Metadata::new())
        .unwrap();
    store
        .create("notes", "rust lifetimes explained with examples", Metadata::new())
        .unwrap();

    let results = store
        .search("notes", "rust lifetimes and borrowing", SearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].document, "rust lifetimes and borrowing");

    let distances: Vec<f64> = results.iter().map(|m| m.distance.unwrap()).collect();
    let mut sorted = distances.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(distances, sorted);
}

#[test]
fn test_search_with_metadata_and_text_filters() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .create(
            "notes",
            "deploy checklist for staging",
            Metadata::new().with("env", "staging"),
        )
        .unwrap();
    store
        .create(
            "notes",
            "deploy checklist for production",
            Metadata::new().with("env", "production"),
        )
        .unwrap();

    let results = store
        .search(
            "notes",
            "deploy checklist",
            SearchOptions {
                filter_metadata: Some(Metadata::new().with("env", "production")),
                ..SearchOptions::default()
            },
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].document.contains("production"));

    let results = store
        .search(
            "notes",
            "deploy checklist",
            SearchOptions {
                contains_text: Some("staging".to_string()),
                ..SearchOptions::default()
            },
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].document.contains("staging"));
}

#[test]
fn test_empty_category_searches_empty() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let results = store
        .search("nothing-here", "query", SearchOptions::default())
        .unwrap();
    assert!(results.is_empty());

    let listed = store.get_many("nothing-here", GetOptions::default()).unwrap();
    assert!(listed.is_empty());
}

#[test]
fn test_get_many_pagination_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    for i in 0..10 {
        store
            .create("log", &format!("entry number {i}"), Metadata::new())
            .unwrap();
    }

    let newest = store
        .get_many(
            "log",
            GetOptions {
                n_results: 3,
                ..GetOptions::default()
            },
        )
        .unwrap();
    assert_eq!(newest.len(), 3);
    assert_eq!(newest[0].id, "0000000000000009");

    let oldest = store
        .get_many(
            "log",
            GetOptions {
                n_results: 3,
                sort_order: SortOrder::Asc,
                ..GetOptions::default()
            },
        )
        .unwrap();
    assert_eq!(oldest[0].id, "0000000000000000");
}

#[test]
fn test_unique_memories_workflow() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let first = store
        .create_unique("people", "bob prefers tea over coffee", Metadata::new(), 0.95)
        .unwrap();
    assert!(matches!(first, UniqueOutcome::Unique { .. }));

    let second = store
        .create_unique("people", "bob prefers tea over coffee", Metadata::new(), 0.95)
        .unwrap();
    let UniqueOutcome::Related { related_to, .. } = &second else {
        panic!("duplicate content should be related");
    };
    assert_eq!(related_to, first.id());

    // both records exist; only one counts as unique
    assert_eq!(store.count("people", false).unwrap(), 2);
    assert_eq!(store.count("people", true).unwrap(), 1);

    // searching unique-only hides the duplicate
    let results = store
        .search(
            "people",
            "bob prefers tea",
            SearchOptions {
                unique: true,
                ..SearchOptions::default()
            },
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, first.id());
}

#[test]
fn test_delete_similar_then_search() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .create("notes", "remember to rotate the api keys", Metadata::new())
        .unwrap();
    store
        .create("notes", "remember to rotate the api keys", Metadata::new())
        .unwrap();
    store
        .create("notes", "plant the tomatoes in may", Metadata::new())
        .unwrap();

    assert!(
        store
            .delete_similar("notes", "remember to rotate the api keys", 0.95)
            .unwrap()
    );
    assert_eq!(store.count("notes", false).unwrap(), 1);

    // a second pass finds nothing left above the threshold
    assert!(
        !store
            .delete_similar("notes", "remember to rotate the api keys", 0.95)
            .unwrap()
    );
}

#[test]
fn test_wipe_all_clears_every_category() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store.create("a", "one", Metadata::new()).unwrap();
    store.create("b", "two", Metadata::new()).unwrap();
    store.create("c", "three", Metadata::new()).unwrap();

    assert_eq!(store.wipe_all().unwrap(), 3);
    for category in ["a", "b", "c"] {
        assert_eq!(store.count(category, false).unwrap(), 0);
    }
    // wiping again is a harmless no-op
    assert_eq!(store.wipe_all().unwrap(), 0);
}

#[test]
fn test_memory_serializes_for_downstream_consumers() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let id = store
        .create("notes", "serialize me", Metadata::new().with("k", "v"))
        .unwrap();
    let memory: Memory = store.get("notes", &id, false).unwrap().unwrap();

    let json = serde_json::to_value(&memory).unwrap();
    assert_eq!(json["document"], "serialize me");
    assert_eq!(json["metadata"]["k"], "v");
    assert!(json.get("embedding").is_none());
}
