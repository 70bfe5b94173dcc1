use crate::state::page::{Page, ScraperData, SeedSite};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Concurrency-guarded page store and watchlist
///
/// Both maps sit behind one reader/writer gate. Every method takes the lock for
/// the duration of a single map operation and releases it before returning, so
/// no caller ever holds it across I/O or an `.await`.
#[derive(Debug, Default)]
pub struct CrawlStore {
    data: RwLock<ScraperData>,
}

impl CrawlStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with previously persisted data
    pub fn from_data(data: ScraperData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    // Every critical section leaves both maps consistent, so a poisoned
    // lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, ScraperData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScraperData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Pages =====

    /// Starts a visit by replacing any record at `url` with an empty one
    ///
    /// A re-crawl discards the previous title, summary and links.
    pub fn begin_visit(&self, url: &str, time: i64) {
        self.write()
            .pages
            .insert(url.to_string(), Page::new(url, time));
    }

    /// Mutates the page at `url` under exclusive access
    ///
    /// Returns false when no visit has begun for `url`.
    pub fn update_page<F>(&self, url: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Page),
    {
        match self.write().pages.get_mut(url) {
            Some(page) => {
                mutate(page);
                true
            }
            None => false,
        }
    }

    /// Reads the page at `url` under shared access
    pub fn with_page<F, R>(&self, url: &str, read: F) -> Option<R>
    where
        F: FnOnce(&Page) -> R,
    {
        self.read().pages.get(url).map(read)
    }

    /// Returns a copy of the page at `url`
    pub fn page(&self, url: &str) -> Option<Page> {
        self.with_page(url, Page::clone)
    }

    /// Calls `visit` for every page under shared access
    pub fn for_each_page<F>(&self, mut visit: F)
    where
        F: FnMut(&Page),
    {
        for page in self.read().pages.values() {
            visit(page);
        }
    }

    pub fn page_count(&self) -> usize {
        self.read().pages.len()
    }

    // ===== Watchlist =====

    /// Adds a never-checked entry for every seed missing from the watchlist
    ///
    /// Existing entries, including ones whose seed left the configuration,
    /// are left alone.
    ///
    /// # Returns
    ///
    /// The seeds that were added
    pub fn reconcile_seeds(&self, seeds: &[String]) -> Vec<String> {
        let mut data = self.write();
        let mut added = Vec::new();
        for seed in seeds {
            if !data.watchlist.contains_key(seed) {
                data.watchlist.insert(seed.clone(), SeedSite::new(seed.clone()));
                added.push(seed.clone());
            }
        }
        added
    }

    /// Lists every watched site
    pub fn watchlist_sites(&self) -> Vec<String> {
        self.read().watchlist.keys().cloned().collect()
    }

    /// Returns a copy of the watchlist entry for `site`
    pub fn seed(&self, site: &str) -> Option<SeedSite> {
        self.read().watchlist.get(site).cloned()
    }

    /// Returns true if `site` is watched and stale at `now`
    pub fn is_seed_due(&self, site: &str, maxage: i64, now: i64) -> bool {
        self.read()
            .watchlist
            .get(site)
            .is_some_and(|seed| seed.is_due(maxage, now))
    }

    /// Records a check of `site` at `time`
    pub fn mark_checked(&self, site: &str, time: i64) {
        if let Some(seed) = self.write().watchlist.get_mut(site) {
            seed.last_check = time;
        }
    }

    pub fn seed_count(&self) -> usize {
        self.read().watchlist.len()
    }

    // ===== Bulk =====

    /// Copies the whole aggregate under shared access
    pub fn snapshot(&self) -> ScraperData {
        self.read().clone()
    }

    /// Serializes the whole aggregate to JSON under shared access
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&*self.read())
    }

    /// Replaces both maps wholesale
    pub fn replace(&self, data: ScraperData) {
        *self.write() = data;
    }
}
