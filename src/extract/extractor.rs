use crate::extract::text::{accept_link, normalize_text};
use crate::extract::{PageEvents, PageSink};
use crate::state::{unix_now, CrawlStore};
use crate::url::strip_query;
use std::sync::Arc;

/// Meta properties whose content is added to the summary
const SUMMARY_META_PROPERTIES: [&str; 2] = ["og:description", "og:title"];

/// Builds `Page` records in the crawl store from document events
#[derive(Clone)]
pub struct Extractor {
    store: Arc<CrawlStore>,
    sink: Arc<dyn PageSink>,
}

impl Extractor {
    pub fn new(store: Arc<CrawlStore>, sink: Arc<dyn PageSink>) -> Self {
        Self { store, sink }
    }

    fn append_summary(&self, url: &str, kind: &str, raw: &str) {
        let text = normalize_text(raw);
        tracing::trace!("Body {} {}", kind, text);
        if !self.store.update_page(url, |page| page.append_summary(&text)) {
            tracing::warn!("Dropped {} text for {}: visit not started", kind, url);
        }
    }
}

impl PageEvents for Extractor {
    fn on_visit_start(&self, url: &str) {
        tracing::debug!("Visiting {}", url);
        self.store.begin_visit(url, unix_now());
    }

    fn on_title(&self, url: &str, text: &str) {
        let title = normalize_text(text);
        tracing::debug!("Title: {} {}", title, url);
        self.store.update_page(url, |page| page.title = title);
    }

    fn on_meta(&self, url: &str, property: &str, content: &str) {
        let property = normalize_text(property);
        if SUMMARY_META_PROPERTIES.contains(&property.as_str()) {
            self.append_summary(url, "meta", content);
        }
    }

    fn on_heading(&self, url: &str, text: &str) {
        self.append_summary(url, "heading", text);
    }

    fn on_paragraph(&self, url: &str, text: &str) {
        self.append_summary(url, "p", text);
    }

    fn on_code_block(&self, url: &str, text: &str) {
        self.append_summary(url, "code", text);
    }

    fn on_link(&self, url: &str, text: &str, link: &str) -> Option<String> {
        let text = normalize_text(text);
        if !accept_link(link, &text) {
            return None;
        }

        tracing::trace!("Link: {} {}", text, link);
        self.store.update_page(url, |page| {
            page.append_summary(&format!("{}: {}", text, link));
            page.links.insert(text, link.to_string());
        });

        Some(strip_query(link).to_string())
    }

    fn on_visit_complete(&self, url: &str) {
        tracing::debug!("Scraped: {}", url);
        self.store
            .with_page(url, |page| self.sink.on_page_complete(page));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::DiscardPages;
    use crate::state::Page;
    use std::sync::Mutex;

    const URL: &str = "https://example.com/";

    fn extractor() -> (Arc<CrawlStore>, Extractor) {
        let store = Arc::new(CrawlStore::new());
        let extractor = Extractor::new(Arc::clone(&store), Arc::new(DiscardPages));
        (store, extractor)
    }

    #[test]
    fn test_visit_start_creates_page_with_time() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);

        let page = store.page(URL).unwrap();
        assert_eq!(page.url, URL);
        assert!(page.time > 0);
    }

    #[test]
    fn test_title_is_normalized() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);
        extractor.on_title(URL, "\n   My   Site \n");

        assert_eq!(store.page(URL).unwrap().title, "My Site");
    }

    #[test]
    fn test_summary_follows_event_order() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);
        extractor.on_heading(URL, "Intro");
        extractor.on_paragraph(URL, "Body   text");

        assert_eq!(store.page(URL).unwrap().summary, "Intro Body text ");
    }

    #[test]
    fn test_summary_is_not_deduplicated() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);
        extractor.on_code_block(URL, "cargo build");
        extractor.on_code_block(URL, "cargo build");

        assert_eq!(
            store.page(URL).unwrap().summary,
            "cargo build cargo build "
        );
    }

    #[test]
    fn test_only_og_meta_is_summarized() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);
        extractor.on_meta(URL, "og:title", " Site  Title ");
        extractor.on_meta(URL, "description", "ignored");
        extractor.on_meta(URL, "og:description", "About us");

        assert_eq!(store.page(URL).unwrap().summary, "Site Title About us ");
    }

    #[test]
    fn test_accepted_link_is_recorded_and_followed_without_query() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);

        let follow = extractor.on_link(URL, "Docs", "https://example.com/page?x=1");

        assert_eq!(follow.as_deref(), Some("https://example.com/page"));
        let page = store.page(URL).unwrap();
        assert_eq!(
            page.links.get("Docs").map(String::as_str),
            Some("https://example.com/page?x=1")
        );
        assert_eq!(page.summary, "Docs: https://example.com/page?x=1 ");
    }

    #[test]
    fn test_short_link_is_ignored() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);

        let follow = extractor.on_link(URL, "Go", "https://example.com/go");

        assert!(follow.is_none());
        let page = store.page(URL).unwrap();
        assert!(page.links.is_empty());
        assert!(page.summary.is_empty());
    }

    #[test]
    fn test_same_anchor_text_keeps_last_link() {
        let (store, extractor) = extractor();
        extractor.on_visit_start(URL);
        extractor.on_link(URL, "More info", "https://example.com/a");
        extractor.on_link(URL, "More  info", "https://example.com/b");

        let page = store.page(URL).unwrap();
        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links["More info"], "https://example.com/b");
    }

    #[test]
    fn test_complete_hands_page_to_sink() {
        let store = Arc::new(CrawlStore::new());
        let seen: Arc<Mutex<Vec<Page>>> = Arc::default();
        let sink_seen = Arc::clone(&seen);
        let extractor = Extractor::new(
            Arc::clone(&store),
            Arc::new(move |page: &Page| sink_seen.lock().unwrap().push(page.clone())),
        );

        extractor.on_visit_start(URL);
        extractor.on_title(URL, "Home");
        extractor.on_visit_complete(URL);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "Home");
    }

    #[test]
    fn test_complete_without_visit_does_not_call_sink() {
        let store = Arc::new(CrawlStore::new());
        let calls: Arc<Mutex<usize>> = Arc::default();
        let sink_calls = Arc::clone(&calls);
        let extractor = Extractor::new(
            store,
            Arc::new(move |_: &Page| *sink_calls.lock().unwrap() += 1),
        );

        extractor.on_visit_complete(URL);

        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
