//! Error types for muisti.

use thiserror::Error;

/// Main error type for muisti operations.
///
/// Not-found conditions are deliberately *not* represented here: library
/// operations report absence through `Option`, `bool`, or empty results.
/// `NotFound` exists only so the CLI can map absence to a non-zero exit code.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied invalid arguments (e.g. update with nothing to change).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding computation failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Embedding vector has the wrong number of dimensions.
    #[error("Mismatched dimensions: expected {expected}, got {actual}")]
    MismatchedDimensions { expected: usize, actual: usize },

    /// Stored embedding BLOB has the wrong byte length.
    #[error("Invalid BLOB size: expected {expected} bytes, got {actual} bytes")]
    InvalidBlobSize { expected: usize, actual: usize },

    /// Requested record or category does not exist (CLI-facing only).
    #[error("Not found: {0}")]
    NotFound(String),
}
