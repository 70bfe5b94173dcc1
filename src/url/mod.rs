//! URL handling module for Seedwatch
//!
//! This module provides the compiled URL filter set and the link helpers the
//! fetch engine uses when turning an `href` into something it can visit.

mod filter;

pub use filter::{CompiledFilters, UrlFilterSet};

use url::Url;

/// Resolves an `href` against the document base into an absolute URL
///
/// Fragment-only references (`#top`) point back at the same document and
/// resolve to nothing. Fragments are dropped from the result.
///
/// # Examples
///
/// ```
/// use seedwatch::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(
///     resolve_link(&base, "intro#setup").as_deref(),
///     Some("https://example.com/docs/intro")
/// );
/// assert_eq!(resolve_link(&base, "#top"), None);
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.starts_with('#') {
        return None;
    }

    let mut absolute = base.join(href).ok()?;
    absolute.set_fragment(None);
    Some(absolute.into())
}

/// Drops everything from the first `?` on
///
/// `?`-variants of a URL are treated as the same page when following links.
///
/// # Examples
///
/// ```
/// use seedwatch::url::strip_query;
///
/// assert_eq!(strip_query("https://example.com/page?x=1"), "https://example.com/page");
/// assert_eq!(strip_query("https://example.com/page"), "https://example.com/page");
/// ```
pub fn strip_query(link: &str) -> &str {
    match link.split_once('?') {
        Some((head, _)) => head,
        None => link,
    }
}

/// Returns true for URLs the fetch engine is able to visit
pub fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
