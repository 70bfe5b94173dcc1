//! In-memory full-text index over completed pages
//!
//! `MemoryIndex` is the page sink wired up by the binary. Every completed (or
//! restored) page replaces the previous document for its URL. Queries match
//! documents containing every query term and rank them by TF-IDF.

use crate::extract::PageSink;
use crate::state::Page;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchHit {
    #[serde(rename = "URL")]
    pub url: String,
    pub title: String,
    pub time: i64,
    pub score: f64,
}

/// Index size counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
}

#[derive(Debug)]
struct IndexedDoc {
    title: String,
    time: i64,
    /// term -> occurrences in this document
    terms: HashMap<String, u32>,
}

#[derive(Debug, Default)]
struct IndexInner {
    docs: HashMap<String, IndexedDoc>,
    /// term -> urls containing it
    postings: HashMap<String, HashSet<String>>,
}

impl IndexInner {
    fn remove(&mut self, url: &str) {
        let Some(doc) = self.docs.remove(url) else {
            return;
        };
        for term in doc.terms.keys() {
            if let Some(urls) = self.postings.get_mut(term) {
                urls.remove(url);
                if urls.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
    }
}

/// Thread-safe inverted index
#[derive(Debug, Default)]
pub struct MemoryIndex {
    inner: RwLock<IndexInner>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `page`, replacing any earlier document for the same URL
    pub fn index(&self, page: &Page) {
        let mut terms: HashMap<String, u32> = HashMap::new();
        for text in [&page.url, &page.title, &page.summary] {
            for term in tokenize(text) {
                *terms.entry(term).or_default() += 1;
            }
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.remove(&page.url);
        for term in terms.keys() {
            inner
                .postings
                .entry(term.clone())
                .or_default()
                .insert(page.url.clone());
        }
        inner.docs.insert(
            page.url.clone(),
            IndexedDoc {
                title: page.title.clone(),
                time: page.time,
                terms,
            },
        );
    }

    /// Returns up to `limit` documents containing every term of `query`
    ///
    /// Results are ordered by descending score, then by URL.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query_terms: HashSet<String> = tokenize(query).collect();
        if query_terms.is_empty() {
            return Vec::new();
        }

        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let total = inner.docs.len() as f64;

        let mut postings = Vec::with_capacity(query_terms.len());
        for term in &query_terms {
            match inner.postings.get(term) {
                Some(urls) => postings.push((term, urls)),
                None => return Vec::new(),
            }
        }
        // walk the rarest term's postings
        postings.sort_by_key(|(_, urls)| urls.len());

        let mut hits = Vec::new();
        let (_, candidates) = postings[0];
        for url in candidates {
            if !postings.iter().all(|(_, urls)| urls.contains(url)) {
                continue;
            }
            let Some(doc) = inner.docs.get(url) else {
                continue;
            };
            let score = postings
                .iter()
                .map(|(term, urls)| {
                    let tf = doc.terms.get(*term).copied().unwrap_or(0) as f64;
                    let idf = (1.0 + total / urls.len() as f64).ln();
                    tf * idf
                })
                .sum();
            hits.push(SearchHit {
                url: url.clone(),
                title: doc.title.clone(),
                time: doc.time,
                score,
            });
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.url.cmp(&b.url)));
        hits.truncate(limit);
        hits
    }

    pub fn stats(&self) -> IndexStats {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        IndexStats {
            documents: inner.docs.len(),
            terms: inner.postings.len(),
        }
    }
}

impl PageSink for MemoryIndex {
    fn on_page_complete(&self, page: &Page) {
        tracing::debug!("Indexing {}", page.url);
        self.index(page);
    }
}

/// Lowercased alphanumeric runs
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}
