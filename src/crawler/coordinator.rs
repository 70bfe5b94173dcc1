//! Crawler coordinator - owner of the crawl state
//!
//! This module contains the top-level crawler that ties the pieces together:
//! - Holding the live configuration and URL filter set
//! - Owning the page store and watchlist for the life of the process
//! - Running one crawl session over the stale seeds
//! - Saving and restoring the snapshot

use crate::config::{LiveConfig, ScraperConfig};
use crate::crawler::session::{CrawlSession, SessionReport, SessionSettings};
use crate::extract::{Extractor, PageSink};
use crate::state::{unix_now, CrawlStore};
use crate::storage::{read_snapshot, write_snapshot, StorageError};
use crate::url::UrlFilterSet;
use crate::SeedwatchError;
use std::sync::Arc;

/// Summary of one `scrape` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Seeds that were stale and got dispatched
    pub seeds_dispatched: usize,

    /// Seeds skipped because they were checked recently
    pub seeds_fresh: usize,

    /// What the fetch engine did with them
    pub session: SessionReport,
}

/// Main crawler structure
pub struct Coordinator {
    config: Arc<LiveConfig>,
    store: Arc<CrawlStore>,
    filters: UrlFilterSet,
    extractor: Extractor,
    sink: Arc<dyn PageSink>,
}

impl Coordinator {
    /// Creates a coordinator with an empty store
    ///
    /// # Arguments
    ///
    /// * `config` - The startup crawler configuration
    /// * `sink` - Receives every completed or restored page
    pub fn new(config: ScraperConfig, sink: Arc<dyn PageSink>) -> Self {
        Self::with_live_config(Arc::new(LiveConfig::new(config)), sink)
    }

    /// Creates a coordinator around an existing configuration holder
    pub fn with_live_config(config: Arc<LiveConfig>, sink: Arc<dyn PageSink>) -> Self {
        let store = Arc::new(CrawlStore::new());
        let extractor = Extractor::new(Arc::clone(&store), Arc::clone(&sink));

        Self {
            config,
            store,
            filters: UrlFilterSet::new(),
            extractor,
            sink,
        }
    }

    /// The page store and watchlist
    pub fn store(&self) -> &Arc<CrawlStore> {
        &self.store
    }

    /// The configuration in effect right now
    pub fn config(&self) -> Arc<ScraperConfig> {
        self.config.current()
    }

    /// The URL filter set sessions are started with
    pub fn filters(&self) -> &UrlFilterSet {
        &self.filters
    }

    /// Replaces the whole configuration
    ///
    /// Filters and seeds are picked up by the next `scrape`; a session already
    /// running keeps the settings it was started with.
    pub fn update_config(&self, config: ScraperConfig) {
        let previous = self.config.replace(config);
        let current = self.config.current();
        tracing::info!(
            "Config updated: {} seeds (was {}), {} filters (was {}), max depth {}, maxage {}s",
            current.seeds.len(),
            previous.seeds.len(),
            current.url_filters.len(),
            previous.url_filters.len(),
            current.max_depth,
            current.maxage
        );
    }

    /// Recompiles the URL filters from `config`
    ///
    /// A pattern that fails to compile leaves the previous filter set active.
    pub fn reconcile_filters(&self, config: &ScraperConfig) {
        match self.filters.recompile(&config.url_filters) {
            Ok(count) => tracing::debug!("Compiled {} URL filters", count),
            Err(e) => tracing::error!("Keeping previous URL filters: {}", e),
        }
    }

    /// Adds every configured seed that is not yet on the watchlist
    ///
    /// # Returns
    ///
    /// The seeds that were added
    pub fn reconcile_seeds(&self, config: &ScraperConfig) -> Vec<String> {
        let added = self.store.reconcile_seeds(&config.seeds);
        for seed in &added {
            tracing::debug!("Adding seed {}", seed);
        }
        added
    }

    /// Runs one crawl session over every stale seed
    ///
    /// This method:
    /// 1. Reconciles filters and seeds against the current configuration
    /// 2. Starts a fresh fetch-engine session
    /// 3. Dispatches each stale seed and stamps its check time
    /// 4. Waits for all visits, including followed links, to finish
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeReport)` - Session finished; individual visits may have failed
    /// * `Err(SeedwatchError)` - The session could not be started
    pub async fn scrape(&self) -> Result<ScrapeReport, SeedwatchError> {
        let config = self.config.current();
        self.reconcile_filters(&config);
        self.reconcile_seeds(&config);

        let settings = SessionSettings::from_config(&config, self.filters.current());
        let mut session = CrawlSession::new(settings, Arc::new(self.extractor.clone()))?;

        let mut report = ScrapeReport::default();
        for site in self.store.watchlist_sites() {
            let now = unix_now();
            if self.store.is_seed_due(&site, config.maxage, now) {
                tracing::debug!("Max age expired: {}", site);
                session.visit(&site);
                // stamped at dispatch, not when the visit finishes
                self.store.mark_checked(&site, unix_now());
                report.seeds_dispatched += 1;
            } else {
                tracing::debug!("Max age not expired: {}", site);
                report.seeds_fresh += 1;
            }
        }

        report.session = session.finish().await;
        Ok(report)
    }

    /// Serializes the whole store and watchlist to JSON
    pub fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        self.store.to_json().map_err(StorageError::Serialization)
    }

    /// Writes the snapshot to the configured save file
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Snapshot written
    /// * `Ok(false)` - Persistence is disabled (no save file)
    /// * `Err(StorageError)` - Serialization or the write failed
    pub async fn save(&self) -> Result<bool, StorageError> {
        let config = self.config.current();
        let Some(path) = config.save_path() else {
            return Ok(false);
        };

        let bytes = self.to_json()?;
        write_snapshot(path, &bytes).await?;
        tracing::info!(
            "Saved {} pages and {} seeds to {}",
            self.store.page_count(),
            self.store.seed_count(),
            path.display()
        );
        Ok(true)
    }

    /// Restores the snapshot from the configured save file
    ///
    /// The store is replaced wholesale and every restored page is handed to
    /// the sink, so the index is rebuilt without refetching.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Snapshot restored
    /// * `Ok(false)` - Persistence disabled or no snapshot written yet
    /// * `Err(StorageError)` - The snapshot exists but could not be read
    pub async fn load(&self) -> Result<bool, StorageError> {
        let config = self.config.current();
        let Some(path) = config.save_path() else {
            return Ok(false);
        };

        tracing::debug!("Loading previous snapshot from {}", path.display());
        let Some(data) = read_snapshot(path).await? else {
            tracing::info!("No snapshot at {}, starting empty", path.display());
            return Ok(false);
        };

        self.store.replace(data);
        tracing::debug!("Done loading, indexing");
        self.store
            .for_each_page(|page| self.sink.on_page_complete(page));
        tracing::info!(
            "Restored {} pages and {} seeds from {}",
            self.store.page_count(),
            self.store.seed_count(),
            path.display()
        );
        Ok(true)
    }
}
