//! Configuration module for Seedwatch
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and holds the crawler configuration that is live at any moment.
//!
//! # Example
//!
//! ```no_run
//! use seedwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.scraper.max_depth);
//! ```

mod live;
mod parser;
mod types;
mod validation;

pub use live::LiveConfig;
pub use types::{
    Config, ScraperConfig, DEFAULT_MAXAGE, DEFAULT_MAX_CONCURRENT_VISITS, DEFAULT_MAX_DEPTH,
    DEFAULT_USER_AGENT,
};

pub use parser::{load_config, load_config_with_hash, parse_config};
pub use validation::validate_scraper_config;
