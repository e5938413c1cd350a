//! JSON response types and formatting for CLI output.

use serde::Serialize;

use muisti::Memory;

/// Response for operations that act on a single id.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub id: String,
}

/// Response for uniqueness-checked adds.
#[derive(Serialize)]
pub struct UniqueAddResponse {
    pub status: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_document: Option<String>,
}

/// Response for search results.
#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<Memory>,
}

/// Response for listing memories.
#[derive(Serialize)]
pub struct ListResponse {
    pub memories: Vec<Memory>,
}

/// Response for count queries.
#[derive(Serialize)]
pub struct CountResponse {
    pub category: String,
    pub count: usize,
}

/// Response for existence checks.
#[derive(Serialize)]
pub struct ExistsResponse {
    pub id: String,
    pub exists: bool,
}

/// Response for wipe operations.
#[derive(Serialize)]
pub struct WipeResponse {
    pub status: String,
    pub wiped: usize,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}
