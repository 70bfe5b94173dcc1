//! Seedwatch: a scheduled web crawler with a live page snapshot
//!
//! This crate keeps a concurrently-updated store of discovered pages, re-crawls
//! a watchlist of seed URLs once they go stale, follows outbound links up to a
//! depth limit and persists the whole snapshot to disk after every pass.

pub mod api;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod index;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Seedwatch operations
#[derive(Debug, Error)]
pub enum SeedwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL filter: {0}")]
    InvalidPattern(String),
}

/// URL filter compilation errors
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("pattern '{pattern}' does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Result type alias for Seedwatch operations
pub type Result<T> = std::result::Result<T, SeedwatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, LiveConfig, ScraperConfig};
pub use crawler::Coordinator;
pub use extract::{Extractor, PageEvents, PageSink};
pub use state::{CrawlStore, Page, ScraperData, SeedSite};
pub use url::UrlFilterSet;
