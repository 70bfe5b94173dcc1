//! Compiled URL allow-patterns

use crate::FilterError;
use regex::Regex;
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable compiled filter list handed to one crawl session
///
/// An empty list allows every URL; otherwise a URL must match at least one
/// pattern.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    patterns: Arc<Vec<Regex>>,
}

impl CompiledFilters {
    /// Compiles every pattern; the first invalid one aborts the whole batch
    pub fn compile(sources: &[String]) -> Result<Self, FilterError> {
        let mut patterns = Vec::with_capacity(sources.len());
        for source in sources {
            let regex = Regex::new(source).map_err(|e| FilterError::InvalidPattern {
                pattern: source.clone(),
                source: e,
            })?;
            patterns.push(regex);
        }
        Ok(Self {
            patterns: Arc::new(patterns),
        })
    }

    /// Returns true if the URL may be visited
    pub fn allows(&self, url: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|re| re.is_match(url))
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The active filter set, shared by the coordinator and its sessions
#[derive(Debug, Default)]
pub struct UrlFilterSet {
    active: RwLock<CompiledFilters>,
}

impl UrlFilterSet {
    /// Creates an empty (allow-all) filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `sources` and replaces the active set in one step
    ///
    /// On error the previously active set stays in place untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of patterns now active
    /// * `Err(FilterError)` - A pattern failed to compile
    pub fn recompile(&self, sources: &[String]) -> Result<usize, FilterError> {
        let compiled = CompiledFilters::compile(sources)?;
        let count = compiled.len();
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = compiled;
        Ok(count)
    }

    /// Returns the set currently in effect
    pub fn current(&self) -> CompiledFilters {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Checks a URL against the set currently in effect
    pub fn allows(&self, url: &str) -> bool {
        self.current().allows(url)
    }
}
