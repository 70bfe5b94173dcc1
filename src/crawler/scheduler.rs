//! Periodic driver for crawl sessions
//!
//! The loop has two phases:
//! - bootstrap, run once: restore the snapshot, crawl, save
//! - steady state, every tick: crawl, save
//!
//! Each seed decides for itself whether it is due (see `SeedSite::is_due`), so
//! a single fixed tick serves every staleness threshold.

use crate::crawler::coordinator::Coordinator;
use crate::SeedwatchError;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Time between two steady-state crawl sessions
pub const SCRAPE_INTERVAL: Duration = Duration::from_secs(60);

/// Drives crawl sessions for the life of the process
pub struct ScrapeLoop {
    coordinator: Arc<Coordinator>,
    interval: Duration,
}

impl ScrapeLoop {
    /// Creates a loop ticking every [`SCRAPE_INTERVAL`]
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self::with_interval(coordinator, SCRAPE_INTERVAL)
    }

    pub fn with_interval(coordinator: Arc<Coordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Restores the snapshot, then runs the first crawl and save
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Bootstrap finished (crawl or save failures are only logged)
    /// * `Err(SeedwatchError)` - The snapshot exists but could not be restored
    pub async fn bootstrap(&self) -> Result<(), SeedwatchError> {
        self.coordinator.load().await?;
        self.cycle().await;
        tracing::info!("Finished first scrape");
        Ok(())
    }

    /// Runs one crawl followed by one save
    ///
    /// Failures are logged; the next cycle simply tries again.
    pub async fn cycle(&self) {
        match self.coordinator.scrape().await {
            Ok(report) => tracing::info!(
                "Scrape finished: {} seeds dispatched, {} fresh, {} visits ({} completed, {} failed)",
                report.seeds_dispatched,
                report.seeds_fresh,
                report.session.visits,
                report.session.completed,
                report.session.failed
            ),
            Err(e) => tracing::error!("Scrape failed: {}", e),
        }

        if let Err(e) = self.coordinator.save().await {
            tracing::error!("Failed to save snapshot: {}", e);
        }
    }

    /// Bootstraps, then crawls on every tick forever
    ///
    /// Only returns if bootstrap fails.
    pub async fn run_forever(self) -> Result<Infallible, SeedwatchError> {
        self.bootstrap().await?;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.cycle().await;
        }
    }
}
