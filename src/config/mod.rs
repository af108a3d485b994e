//! Configuration module for Caissa-Harvest
//!
//! Tunables are loaded from a TOML file and validated; the discovery and
//! extraction credentials are resolved from the environment and their
//! absence is startup-fatal.
//!
//! # Example
//!
//! ```no_run
//! use caissa_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Page budget: {}", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, DiscoveryConfig, ExtractionConfig, OutputConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, DISCOVERY_KEY_VAR, EXTRACTION_KEY_VAR,
};
