//! Command handlers for the muisti CLI.

use std::process::ExitCode;

use muisti::{
    Config, CreateOptions, Error, GetOptions, MemoryStore, Metadata, SearchOptions, SortOrder,
    UniqueOutcome,
};

use crate::output::*;

/// Commands supported by the muisti CLI.
///
/// Every command is scoped to a category (except `wipe-all` and
/// `version`); categories are created on first write.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Add a memory to a category
    Add {
        category: String,

        /// Memory text content
        text: String,

        /// Metadata as key=value pairs (repeatable)
        #[arg(short = 'm', long = "meta")]
        meta: Vec<String>,

        /// Explicit id (overwrites an existing memory with the same id)
        #[arg(long)]
        id: Option<String>,
    },
    /// Add a memory unless a very similar unique one exists
    AddUnique {
        category: String,
        text: String,

        #[arg(short = 'm', long = "meta")]
        meta: Vec<String>,

        /// Similarity threshold for the uniqueness check
        #[arg(long)]
        similarity: Option<f64>,
    },
    /// Search a category by semantic similarity
    Search {
        category: String,

        /// Search query text
        query: String,

        /// Maximum number of results
        #[arg(short = 'l', long)]
        limit: Option<usize>,

        /// Restrict to documents containing this substring
        #[arg(long)]
        contains: Option<String>,

        /// Metadata equality filters as key=value pairs (repeatable)
        #[arg(short = 'm', long = "meta")]
        meta: Vec<String>,

        /// Inclusive lower bound on distance
        #[arg(long)]
        min_distance: Option<f64>,

        /// Inclusive upper bound on distance
        #[arg(long)]
        max_distance: Option<f64>,

        /// Only memories flagged unique
        #[arg(long)]
        unique: bool,
    },
    /// Get a memory by id
    Get {
        category: String,
        id: String,
    },
    /// List memories sorted by id
    List {
        category: String,

        /// Maximum number of results
        #[arg(short = 'l', long, default_value = "20")]
        limit: usize,

        /// Sort order for ids
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        order: SortOrder,

        /// Restrict to documents containing this substring
        #[arg(long)]
        contains: Option<String>,

        #[arg(short = 'm', long = "meta")]
        meta: Vec<String>,

        /// Only memories flagged unique
        #[arg(long)]
        unique: bool,
    },
    /// Update a memory's text and/or metadata
    Update {
        category: String,
        id: String,

        /// New text content
        #[arg(long)]
        text: Option<String>,

        #[arg(short = 'm', long = "meta")]
        meta: Vec<String>,
    },
    /// Delete a memory by id
    Delete {
        category: String,
        id: String,
    },
    /// Delete memories very similar to the given content
    DeleteSimilar {
        category: String,
        content: String,

        /// Similarity threshold above which memories are deleted
        #[arg(long)]
        similarity: Option<f64>,
    },
    /// Check whether a memory exists
    Exists {
        category: String,
        id: String,
    },
    /// Count memories in a category
    Count {
        category: String,

        /// Count only memories flagged unique
        #[arg(long)]
        unique: bool,
    },
    /// Delete an entire category
    WipeCategory {
        category: String,
    },
    /// Delete every category in the store
    WipeAll,
    Version,
}

/// Parse repeated `key=value` arguments into metadata.
fn parse_meta(pairs: &[String]) -> Result<Metadata, Error> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            Error::InvalidArgument(format!("metadata must be key=value, got '{pair}'"))
        })?;
        metadata.insert(key, value);
    }
    Ok(metadata)
}

/// Execute a CLI command.
pub fn execute(
    command: &Commands,
    store: &MemoryStore,
    config: &Config,
    json: bool,
) -> Result<ExitCode, Error> {
    match command {
        Commands::Add {
            category,
            text,
            meta,
            id,
        } => handle_add(store, category, text, meta, id.clone(), json),
        Commands::AddUnique {
            category,
            text,
            meta,
            similarity,
        } => {
            let similarity = similarity.unwrap_or(config.similarity_threshold);
            handle_add_unique(store, category, text, meta, similarity, json)
        }
        Commands::Search {
            category,
            query,
            limit,
            contains,
            meta,
            min_distance,
            max_distance,
            unique,
        } => {
            let options = SearchOptions {
                n_results: limit.unwrap_or(config.search_limit),
                filter_metadata: optional_meta(meta)?,
                contains_text: contains.clone(),
                min_distance: *min_distance,
                max_distance: *max_distance,
                unique: *unique,
                include_embeddings: false,
                ..SearchOptions::default()
            };
            handle_search(store, category, query, options, json)
        }
        Commands::Get { category, id } => handle_get(store, category, id, json),
        Commands::List {
            category,
            limit,
            order,
            contains,
            meta,
            unique,
        } => {
            let options = GetOptions {
                sort_order: *order,
                contains_text: contains.clone(),
                filter_metadata: optional_meta(meta)?,
                n_results: *limit,
                include_embeddings: false,
                unique: *unique,
            };
            handle_list(store, category, options, json)
        }
        Commands::Update {
            category,
            id,
            text,
            meta,
        } => handle_update(store, category, id, text.as_deref(), meta, json),
        Commands::Delete { category, id } => handle_delete(store, category, id, json),
        Commands::DeleteSimilar {
            category,
            content,
            similarity,
        } => {
            let similarity = similarity.unwrap_or(config.similarity_threshold);
            handle_delete_similar(store, category, content, similarity, json)
        }
        Commands::Exists { category, id } => handle_exists(store, category, id, json),
        Commands::Count { category, unique } => handle_count(store, category, *unique, json),
        Commands::WipeCategory { category } => handle_wipe_category(store, category, json),
        Commands::WipeAll => handle_wipe_all(store, json),
        Commands::Version => handle_version(json),
    }
}

fn optional_meta(pairs: &[String]) -> Result<Option<Metadata>, Error> {
    if pairs.is_empty() {
        return Ok(None);
    }
    parse_meta(pairs).map(Some)
}

fn handle_add(
    store: &MemoryStore,
    category: &str,
    text: &str,
    meta: &[String],
    id: Option<String>,
    json: bool,
) -> Result<ExitCode, Error> {
    let options = CreateOptions {
        id,
        embedding: None,
    };
    let id = store.create_with(category, text, parse_meta(meta)?, options)?;
    if json {
        print_json(&StatusResponse {
            status: "added".to_string(),
            id,
        });
    } else {
        println!("Added memory: {}", id);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_add_unique(
    store: &MemoryStore,
    category: &str,
    text: &str,
    meta: &[String],
    similarity: f64,
    json: bool,
) -> Result<ExitCode, Error> {
    let outcome = store.create_unique(category, text, parse_meta(meta)?, similarity)?;
    match outcome {
        UniqueOutcome::Unique { id } => {
            if json {
                print_json(&UniqueAddResponse {
                    status: "unique".to_string(),
                    id,
                    related_to: None,
                    related_document: None,
                });
            } else {
                println!("Added unique memory: {}", id);
            }
        }
        UniqueOutcome::Related {
            id,
            related_to,
            related_document,
        } => {
            if json {
                print_json(&UniqueAddResponse {
                    status: "related".to_string(),
                    id,
                    related_to: Some(related_to),
                    related_document: Some(related_document),
                });
            } else {
                println!("Added memory: {} (similar to {})", id, related_to);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_search(
    store: &MemoryStore,
    category: &str,
    query: &str,
    options: SearchOptions,
    json: bool,
) -> Result<ExitCode, Error> {
    let results = store.search(category, query, options)?;
    if json {
        print_json(&SearchResponse { results });
    } else {
        for memory in results {
            let distance = memory.distance.unwrap_or(1.0);
            println!(
                "{} [distance: {:.3}]\n  {}\n",
                memory.id, distance, memory.document
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_get(
    store: &MemoryStore,
    category: &str,
    id: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let memory = store
        .get(category, id, false)?
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    if json {
        print_json(&memory);
    } else {
        println!("ID: {}", memory.id);
        println!("Document: {}", memory.document);
        for (key, value) in &memory.metadata {
            println!("  {}: {}", key, value);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_list(
    store: &MemoryStore,
    category: &str,
    options: GetOptions,
    json: bool,
) -> Result<ExitCode, Error> {
    let memories = store.get_many(category, options)?;
    if json {
        print_json(&ListResponse { memories });
    } else {
        for memory in memories {
            println!("{}: {}", memory.id, memory.document);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_update(
    store: &MemoryStore,
    category: &str,
    id: &str,
    text: Option<&str>,
    meta: &[String],
    json: bool,
) -> Result<ExitCode, Error> {
    let metadata = optional_meta(meta)?;
    let updated = store.update(category, id, text, metadata)?;
    if !updated {
        return Err(Error::NotFound(id.to_string()));
    }
    if json {
        print_json(&StatusResponse {
            status: "updated".to_string(),
            id: id.to_string(),
        });
    } else {
        println!("Updated memory: {}", id);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_delete(
    store: &MemoryStore,
    category: &str,
    id: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    if !store.delete(category, id)? {
        return Err(Error::NotFound(id.to_string()));
    }
    if json {
        print_json(&StatusResponse {
            status: "deleted".to_string(),
            id: id.to_string(),
        });
    } else {
        println!("Deleted memory: {}", id);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_delete_similar(
    store: &MemoryStore,
    category: &str,
    content: &str,
    similarity: f64,
    json: bool,
) -> Result<ExitCode, Error> {
    let deleted = store.delete_similar(category, content, similarity)?;
    if json {
        print_json(&WipeResponse {
            status: if deleted { "deleted" } else { "none-found" }.to_string(),
            wiped: usize::from(deleted),
        });
    } else if deleted {
        println!("Deleted similar memories");
    } else {
        println!("No similar memories found");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_exists(
    store: &MemoryStore,
    category: &str,
    id: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let exists = store.exists(category, id, None)?;
    if json {
        print_json(&ExistsResponse {
            id: id.to_string(),
            exists,
        });
    } else {
        println!("{}", exists);
    }
    Ok(if exists {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn handle_count(
    store: &MemoryStore,
    category: &str,
    unique: bool,
    json: bool,
) -> Result<ExitCode, Error> {
    let count = store.count(category, unique)?;
    if json {
        print_json(&CountResponse {
            category: category.to_string(),
            count,
        });
    } else {
        println!("{}", count);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_wipe_category(
    store: &MemoryStore,
    category: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let wiped = store.wipe_category(category)?;
    if json {
        print_json(&WipeResponse {
            status: if wiped { "wiped" } else { "absent" }.to_string(),
            wiped: usize::from(wiped),
        });
    } else if wiped {
        println!("Wiped category: {}", category);
    } else {
        println!("Category does not exist: {}", category);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_wipe_all(store: &MemoryStore, json: bool) -> Result<ExitCode, Error> {
    let wiped = store.wipe_all()?;
    if json {
        print_json(&WipeResponse {
            status: "wiped".to_string(),
            wiped,
        });
    } else {
        println!("Wiped {} categories", wiped);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": env!("CARGO_PKG_NAME")
        }));
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}
