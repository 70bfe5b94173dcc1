//! Records held by the crawl store and written to the snapshot
//!
//! Field names on the wire are PascalCase (`URL`, `LastCheck`, ...) so
//! snapshots stay readable by the tools that consume the `/dump` output.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One discovered document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page {
    /// Key of the page; never changes once the record exists
    #[serde(rename = "URL")]
    pub url: String,

    /// Fragments appended in document order during one visit
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub title: String,

    /// Anchor text to absolute URL; a repeated text keeps the last URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: BTreeMap<String, String>,

    /// Unix timestamp of the visit start
    #[serde(default)]
    pub time: i64,
}

impl Page {
    /// Creates the empty record a visit starts from
    pub fn new(url: impl Into<String>, time: i64) -> Self {
        Self {
            url: url.into(),
            time,
            ..Default::default()
        }
    }

    /// Appends one fragment followed by the separating space
    pub fn append_summary(&mut self, fragment: &str) {
        self.summary.push_str(fragment);
        self.summary.push(' ');
    }
}

/// One watchlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedSite {
    pub site: String,

    /// Unix timestamp of the last crawl dispatch; 0 means never checked
    #[serde(default)]
    pub last_check: i64,
}

impl SeedSite {
    /// A seed that has never been checked
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            last_check: 0,
        }
    }

    /// Returns true once `maxage` seconds have passed since the last check
    pub fn is_due(&self, maxage: i64, now: i64) -> bool {
        self.last_check.saturating_add(maxage) < now
    }
}

/// The persisted aggregate; restored wholesale, never merged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScraperData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: HashMap<String, Page>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub watchlist: HashMap<String, SeedSite>,
}

/// Accepts `null` where a map is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
