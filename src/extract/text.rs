/// Collapses whitespace runs to one space and trims both ends
///
/// # Examples
///
/// ```
/// use seedwatch::extract::normalize_text;
///
/// assert_eq!(normalize_text("  Hello \n\t world  "), "Hello world");
/// ```
pub fn normalize_text(raw: &str) -> String {
    raw.split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Decides whether an anchor is content worth recording and following
///
/// Short or letter-free anchor texts are navigation chrome ("Go", "»", "12")
/// and are skipped, as are links that cannot be fetched over HTTP.
///
/// # Arguments
///
/// * `link` - The resolved absolute URL
/// * `text` - The normalized anchor text
pub fn accept_link(link: &str, text: &str) -> bool {
    link.len() > 4
        && link.contains("http")
        && text.bytes().any(|b| b.is_ascii_alphabetic())
        && text.len() > 3
}
