//! Caissa-Harvest: a chess knowledge harvester
//!
//! This crate turns an open-ended topic (chess knowledge) into a structured,
//! versioned local knowledge base: it discovers candidate pages through a
//! search service, renders them through a remote browser session, normalizes
//! the content to Markdown, asks a schema-constrained language model to
//! extract typed knowledge records, and persists the records as deduplicated
//! front-matter files plus a single searchable index.

pub mod browser;
pub mod config;
pub mod content;
pub mod crawler;
pub mod discovery;
pub mod knowledge;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rendering connection error: {0}")]
    Connection(String),

    #[error("Navigation timeout for {url} after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Extraction response did not match schema: {0}")]
    ExtractionSchema(String),

    #[error("Discovery query \"{query}\" failed: {message}")]
    DiscoveryQuery { query: String, message: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required credential: {0} is not set")]
    MissingCredential(&'static str),
}

/// Errors raised while writing knowledge files or the index manifest
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to encode index manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_harvest, RunReport};
pub use knowledge::{Category, ExtractionBundle, KnowledgeItem, SourceDescriptor};
pub use crate::url::is_in_scope;
