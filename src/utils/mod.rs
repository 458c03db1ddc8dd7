//! Utility functions and helpers.

pub mod http;

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// Returns `None` when the result is not an absolute http(s) URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|u| u.to_string())
}

/// Whether `c` may appear in an XML 1.0 document, escaped or not.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

/// Drop characters that XML 1.0 forbids outright.
pub fn strip_non_xml_chars(s: &str) -> String {
    s.chars().filter(|&c| is_xml_char(c)).collect()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
///
/// Control characters decoded from character references (`&#1;`) are dropped.
pub fn normalize_whitespace(s: &str) -> String {
    strip_non_xml_chars(&s.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Truncate `text` to at most `max` graphemes, appending `ellipsis` when cut.
pub fn truncate_graphemes(text: &str, max: usize, ellipsis: &str) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", text[..cut].trim_end(), ellipsis),
    }
}
