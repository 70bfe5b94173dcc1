use crate::config::types::ScraperConfig;
use std::sync::{Arc, PoisonError, RwLock};

/// Holder for the crawler configuration currently in effect
///
/// Readers get an `Arc` to an immutable snapshot, so a reload can never be
/// observed half-applied. Replacing swaps the whole struct at once.
#[derive(Debug)]
pub struct LiveConfig {
    current: RwLock<Arc<ScraperConfig>>,
}

impl LiveConfig {
    /// Wraps a startup configuration, filling defaults for zero fields
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config.with_defaults())),
        }
    }

    /// Returns the configuration in effect right now
    pub fn current(&self) -> Arc<ScraperConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replaces the configuration and returns the previous one
    pub fn replace(&self, config: ScraperConfig) -> Arc<ScraperConfig> {
        let next = Arc::new(config.with_defaults());
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
