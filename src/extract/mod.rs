//! Content extraction from fetched documents
//!
//! The fetch engine reports what it finds in a document through the
//! [`PageEvents`] trait, one call per element in document order. The
//! [`Extractor`] turns those events into the `Page` record held by the crawl
//! store and hands each finished page to a [`PageSink`].

mod extractor;
mod text;

pub use extractor::Extractor;
pub use text::{accept_link, normalize_text};

use crate::state::Page;

/// Callbacks for one document visit, in the order the fetch engine fires them
///
/// All calls for a given `url` come from a single visit task and are therefore
/// ordered; calls for different URLs may interleave.
pub trait PageEvents: Send + Sync {
    /// A visit to `url` is about to be fetched
    fn on_visit_start(&self, url: &str);

    /// Text of a `<title>` element
    fn on_title(&self, url: &str, text: &str);

    /// A `<meta>` element's `property` and `content` attributes
    fn on_meta(&self, url: &str, property: &str, content: &str);

    /// Text of an `h1` or `h2`
    fn on_heading(&self, url: &str, text: &str);

    /// Text of a `p`
    fn on_paragraph(&self, url: &str, text: &str);

    /// Text of a `pre` or `code`
    fn on_code_block(&self, url: &str, text: &str);

    /// An anchor whose `href` resolved to the absolute `link`
    ///
    /// Returns the URL the fetch engine should follow, if any.
    fn on_link(&self, url: &str, text: &str, link: &str) -> Option<String>;

    /// The document at `url` was fetched and fully walked
    fn on_visit_complete(&self, url: &str);
}

/// Receives every completed page, and every page restored from a snapshot
///
/// Called while the crawl store is held for reading, so implementations must
/// not call back into the store.
pub trait PageSink: Send + Sync {
    fn on_page_complete(&self, page: &Page);
}

impl<F> PageSink for F
where
    F: Fn(&Page) + Send + Sync,
{
    fn on_page_complete(&self, page: &Page) {
        self(page)
    }
}

/// A sink that drops every page
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardPages;

impl PageSink for DiscardPages {
    fn on_page_complete(&self, _page: &Page) {}
}
