//! Crawler module for fetching and processing pages
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching with a permissive TLS transport
//! - HTML walking that feeds the content extractor
//! - Crawl sessions that expand links up to the depth limit
//! - The coordinator owning the crawl state, and its periodic scheduler

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod session;

pub use coordinator::{Coordinator, ScrapeReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult, MAX_BODY_BYTES};
pub use parser::walk_document;
pub use scheduler::{ScrapeLoop, SCRAPE_INTERVAL};
pub use session::{CrawlSession, SessionReport, SessionSettings};
