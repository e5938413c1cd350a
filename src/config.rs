//! Configuration system for muisti.
//!
//! Values resolve with priority: defaults < config file
//! (`~/.muisti/config.toml`) < `MUISTI_*` environment variables.

use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::Error;

/// Resolved configuration values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database.
    pub database_path: PathBuf,

    /// Dimensionality of the bundled hashing embedder.
    pub embedding_dims: usize,

    /// Default similarity threshold for uniqueness checks and
    /// similarity-based deletion.
    pub similarity_threshold: f64,

    /// Default maximum number of search results.
    pub search_limit: usize,
}

/// Raw, partially-specified config file contents.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub database_path: Option<PathBuf>,
    pub embedding_dims: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub search_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let muisti_dir = home.join(".muisti");

        Self {
            database_path: muisti_dir.join("memories.db"),
            embedding_dims: 384,
            similarity_threshold: 0.95,
            search_limit: 5,
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment
    /// overrides.
    pub fn load() -> Result<Self, Error> {
        let file = load_config_file()?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Resolve a config from an optional file and an environment lookup.
    ///
    /// Factored out of [`load`](Self::load) so tests can supply both
    /// inputs without touching the process environment.
    fn resolve(
        file: Option<ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(file) = file {
            config.merge_from_file(file);
        }

        if let Some(path) = env("MUISTI_DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(dims) = env("MUISTI_EMBEDDING_DIMS") {
            config.embedding_dims = parse_env("MUISTI_EMBEDDING_DIMS", &dims)?;
        }
        if let Some(threshold) = env("MUISTI_SIMILARITY_THRESHOLD") {
            config.similarity_threshold = parse_env("MUISTI_SIMILARITY_THRESHOLD", &threshold)?;
        }
        if let Some(limit) = env("MUISTI_SEARCH_LIMIT") {
            config.search_limit = parse_env("MUISTI_SEARCH_LIMIT", &limit)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn merge_from_file(&mut self, file: ConfigFile) {
        if let Some(path) = file.database_path {
            self.database_path = path;
        }
        if let Some(dims) = file.embedding_dims {
            self.embedding_dims = dims;
        }
        if let Some(threshold) = file.similarity_threshold {
            self.similarity_threshold = threshold;
        }
        if let Some(limit) = file.search_limit {
            self.search_limit = limit;
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.embedding_dims == 0 {
            return Err(Error::Config(
                "embedding_dims must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be between 0.0 and 1.0, got {}",
                self.similarity_threshold
            )));
        }
        if self.search_limit == 0 {
            return Err(Error::Config(
                "search_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Ensure the parent directory of the database path exists.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {key}: {value}")))
}

/// Read `~/.muisti/config.toml` if it exists.
fn load_config_file() -> Result<Option<ConfigFile>, Error> {
    let Some(home) = dirs::home_dir() else {
        return Ok(None);
    };
    let path = home.join(".muisti").join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    let file = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;
    Ok(Some(file))
}
