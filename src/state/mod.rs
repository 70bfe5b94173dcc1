//! State module for the crawl snapshot
//!
//! This module holds the page store and seed watchlist that crawl sessions
//! mutate and the snapshot/export paths read.
//!
//! # Components
//!
//! - `Page`: one discovered document and the text extracted from it
//! - `SeedSite`: a watched seed URL and when it was last checked
//! - `ScraperData`: the persisted aggregate of both maps
//! - `CrawlStore`: the lock-guarded owner of a `ScraperData`

mod page;
mod store;

pub use page::{Page, ScraperData, SeedSite};
pub use store::CrawlStore;

/// Current time as a Unix timestamp (seconds)
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
