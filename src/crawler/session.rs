//! One crawl pass over the watchlist
//!
//! A `CrawlSession` is the fetch engine for a single pass. It owns a fresh
//! HTTP client and visited set, spawns one task per page visit, and expands
//! the frontier from the links each visit asks to follow until the depth
//! limit is reached.

use crate::config::ScraperConfig;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::parser::walk_document;
use crate::extract::PageEvents;
use crate::url::{is_fetchable, CompiledFilters};
use crate::SeedwatchError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Fetch-engine settings fixed for the lifetime of one session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub user_agent: String,

    /// Seeds are depth 1; 0 disables the limit
    pub max_depth: u32,

    pub max_concurrent_visits: usize,

    pub filters: CompiledFilters,
}

impl SessionSettings {
    /// Takes the fetch-engine fields from a configuration snapshot
    pub fn from_config(config: &ScraperConfig, filters: CompiledFilters) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_depth: config.max_depth,
            max_concurrent_visits: config.max_concurrent_visits.max(1),
            filters,
        }
    }
}

/// Outcome of a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Visits started (seeds and followed links)
    pub visits: usize,

    /// Visits whose document was fetched and walked
    pub completed: usize,

    /// Visits that failed to fetch
    pub failed: usize,
}

/// Result a visit task hands back to the session driver
struct VisitOutcome {
    depth: u32,
    completed: bool,
    follows: Vec<String>,
}

/// Shared, read-only state every visit task needs
struct VisitContext {
    client: Client,
    events: Arc<dyn PageEvents>,
    permits: Semaphore,
}

/// A single crawl pass
pub struct CrawlSession {
    context: Arc<VisitContext>,
    filters: CompiledFilters,
    max_depth: u32,
    visited: HashSet<String>,
    visits: JoinSet<VisitOutcome>,
    report: SessionReport,
}

impl CrawlSession {
    /// Creates a session wired to `events`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - Ready to accept visits
    /// * `Err(SeedwatchError)` - The HTTP client could not be built
    pub fn new(
        settings: SessionSettings,
        events: Arc<dyn PageEvents>,
    ) -> Result<Self, SeedwatchError> {
        let client = build_http_client(&settings.user_agent)?;

        Ok(Self {
            context: Arc::new(VisitContext {
                client,
                events,
                permits: Semaphore::new(settings.max_concurrent_visits.max(1)),
            }),
            filters: settings.filters,
            max_depth: settings.max_depth,
            visited: HashSet::new(),
            visits: JoinSet::new(),
            report: SessionReport::default(),
        })
    }

    /// Dispatches a visit to a seed URL (depth 1)
    ///
    /// Returns as soon as the visit is queued; call [`CrawlSession::finish`]
    /// to wait for it. Must be called from within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// `true` if a visit was queued, `false` if the URL was rejected (not
    /// http/https, filtered out, or already visited in this session)
    pub fn visit(&mut self, url: &str) -> bool {
        self.dispatch(url.to_string(), 1)
    }

    fn dispatch(&mut self, url: String, depth: u32) -> bool {
        if self.max_depth > 0 && depth > self.max_depth {
            tracing::trace!("Max depth reached, not visiting {}", url);
            return false;
        }

        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Not visiting unparsable URL {}: {}", url, e);
                return false;
            }
        };
        if !is_fetchable(&parsed) {
            return false;
        }

        if !self.filters.allows(&url) {
            tracing::trace!("Filtered out {}", url);
            return false;
        }

        if !self.visited.insert(url.clone()) {
            return false;
        }

        self.report.visits += 1;
        let context = Arc::clone(&self.context);
        self.visits.spawn(async move {
            let (completed, follows) = visit_page(&context, &url).await;
            VisitOutcome {
                depth,
                completed,
                follows,
            }
        });
        true
    }

    /// Waits for every dispatched visit and all link-followed descendants
    pub async fn finish(mut self) -> SessionReport {
        while let Some(joined) = self.visits.join_next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.completed {
                        self.report.completed += 1;
                    } else {
                        self.report.failed += 1;
                    }
                    for follow in outcome.follows {
                        self.dispatch(follow, outcome.depth + 1);
                    }
                }
                Err(e) => {
                    self.report.failed += 1;
                    tracing::warn!("Visit task aborted: {}", e);
                }
            }
        }
        self.report
    }
}

/// Fetches one page and replays its elements to the extractor
///
/// # Returns
///
/// Whether the visit completed, and the links to follow
async fn visit_page(context: &VisitContext, url: &str) -> (bool, Vec<String>) {
    let Ok(_permit) = context.permits.acquire().await else {
        return (false, Vec::new());
    };

    context.events.on_visit_start(url);

    match fetch_url(&context.client, url).await {
        FetchResult::Success {
            final_url,
            content_type,
            body,
            ..
        } => {
            let follows = if FetchResult::is_html(&content_type) {
                walk_document(&body, url, &final_url, context.events.as_ref())
            } else {
                Vec::new()
            };
            context.events.on_visit_complete(url);
            (true, follows)
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Visit to {} failed: HTTP {}", url, status_code);
            (false, Vec::new())
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Visit to {} failed: {}", url, error);
            (false, Vec::new())
        }
    }
}
