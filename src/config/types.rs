use serde::Deserialize;
use std::path::Path;

/// Staleness threshold used when the config leaves `maxage` at zero (seconds)
pub const DEFAULT_MAXAGE: i64 = 3600;

/// Link-following depth used when the config leaves `max-depth` at zero
pub const DEFAULT_MAX_DEPTH: u32 = 7;

/// Concurrent visit limit used when the config leaves `max-concurrent-visits` at zero
pub const DEFAULT_MAX_CONCURRENT_VISITS: usize = 8;

/// User agent sent when the config does not name one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/79.0.3945.88 Safari/537.36";

/// Main configuration structure for Seedwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the query/admin HTTP surface binds to
    #[serde(rename = "listen-address", default = "default_listen_address")]
    pub listen_address: String,

    /// Crawl behaviour; this is the part that can be swapped on reload
    #[serde(default)]
    pub scraper: ScraperConfig,
}

fn default_listen_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Crawler behaviour configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScraperConfig {
    /// Path of the JSON snapshot; empty disables persistence
    #[serde(rename = "save-file", default)]
    pub save_file: String,

    /// Seconds a seed must rest before it is crawled again
    #[serde(default)]
    pub maxage: i64,

    /// Log crawl progress (visits, seeds, sessions)
    #[serde(default)]
    pub verbose: bool,

    /// Log every extracted element
    #[serde(default)]
    pub debug: bool,

    /// User agent for all fetches
    #[serde(rename = "user-agent", default)]
    pub user_agent: String,

    /// Maximum link depth; seeds are depth 1
    #[serde(rename = "max-depth", default)]
    pub max_depth: u32,

    /// Upper bound on visits in flight within one session
    #[serde(rename = "max-concurrent-visits", default)]
    pub max_concurrent_visits: usize,

    /// Allow-patterns (regular expressions) a URL must match to be visited
    #[serde(rename = "url-filters", default)]
    pub url_filters: Vec<String>,

    /// Seed URLs revisited once they go stale
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl ScraperConfig {
    /// Fills zero/empty fields with their defaults
    pub fn with_defaults(mut self) -> Self {
        if self.maxage == 0 {
            self.maxage = DEFAULT_MAXAGE;
        }
        if self.user_agent.is_empty() {
            self.user_agent = DEFAULT_USER_AGENT.to_string();
        }
        if self.max_depth == 0 {
            self.max_depth = DEFAULT_MAX_DEPTH;
        }
        if self.max_concurrent_visits == 0 {
            self.max_concurrent_visits = DEFAULT_MAX_CONCURRENT_VISITS;
        }
        self
    }

    /// Snapshot location, or `None` when persistence is disabled
    pub fn save_path(&self) -> Option<&Path> {
        if self.save_file.is_empty() {
            None
        } else {
            Some(Path::new(&self.save_file))
        }
    }
}
