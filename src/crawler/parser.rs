//! HTML walker that feeds document elements to the extractor
//!
//! This module parses a fetched document and reports, in document order:
//! - `<title>` text
//! - `<meta>` property/content pairs
//! - `h1`, `h2`, `p`, `pre` and `code` text
//! - `<a href>` anchors, resolved to absolute URLs

use crate::extract::PageEvents;
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Every element kind the extractor listens for
const EVENT_SELECTOR: &str = "title, meta, h1, h2, p, pre, code, a[href]";

/// Walks an HTML document and reports each relevant element to `events`
///
/// Links are resolved against `<base href>` when present, otherwise against
/// `base_url` (the final URL after redirects).
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the visit was started for; the store key
/// * `base_url` - The base URL for resolving relative links
/// * `events` - Receiver of the element events
///
/// # Returns
///
/// The URLs `events` asked to follow, in document order
///
/// # Example
///
/// ```no_run
/// use seedwatch::crawler::walk_document;
/// use seedwatch::extract::{DiscardPages, Extractor, PageEvents};
/// use seedwatch::state::CrawlStore;
/// use std::sync::Arc;
/// use url::Url;
///
/// let store = Arc::new(CrawlStore::new());
/// let extractor = Extractor::new(store.clone(), Arc::new(DiscardPages));
/// let base = Url::parse("https://example.com/").unwrap();
///
/// extractor.on_visit_start(base.as_str());
/// let html = r#"<html><body><a href="/guide?page=2">Read the guide</a></body></html>"#;
/// let follows = walk_document(html, base.as_str(), &base, &extractor);
/// assert_eq!(follows, vec!["https://example.com/guide".to_string()]);
/// ```
pub fn walk_document(
    html: &str,
    page_url: &str,
    base_url: &Url,
    events: &dyn PageEvents,
) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    let selector = match Selector::parse(EVENT_SELECTOR) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::error!("Invalid element selector: {:?}", e);
            return Vec::new();
        }
    };

    let mut follows = Vec::new();
    for element in document.select(&selector) {
        let attrs = element.value();
        match attrs.name() {
            "title" => events.on_title(page_url, &element_text(&element)),
            "meta" => events.on_meta(
                page_url,
                attrs.attr("property").unwrap_or(""),
                attrs.attr("content").unwrap_or(""),
            ),
            "h1" | "h2" => events.on_heading(page_url, &element_text(&element)),
            "p" => events.on_paragraph(page_url, &element_text(&element)),
            "pre" | "code" => events.on_code_block(page_url, &element_text(&element)),
            "a" => {
                let Some(link) = attrs.attr("href").and_then(|href| resolve_link(&base, href))
                else {
                    continue;
                };
                if let Some(follow) = events.on_link(page_url, &element_text(&element), &link) {
                    follows.push(follow);
                }
            }
            _ => {}
        }
    }

    follows
}

/// Concatenated text of an element and all its descendants
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Resolves `<base href>` against the response URL, if the document has one
fn document_base(document: &Html, response_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|base| base.value().attr("href"))
                .and_then(|href| response_url.join(href).ok())
        })
        .unwrap_or_else(|| response_url.clone())
}
