//! Plain-text extraction from scraped HTML fragments
//!
//! Chapter artifacts are stored as plain text. When the scraper already
//! produced a paragraph-joined text body it is used as-is; otherwise the
//! structural HTML content is flattened by dropping its tags. The fallback
//! order is fixed: plain text field first, tag-stripped content second.

use scraper::Html;

/// Flattens an HTML fragment to its text content, dropping all tags.
pub fn strip_tags(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Chooses the artifact body for a chapter: the pre-extracted plain text
/// when it is non-empty, otherwise the content HTML with tags removed.
pub fn chapter_body(plain_text: Option<&str>, content_html: &str) -> String {
    match plain_text {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => strip_tags(content_html),
    }
}

/// Counts whitespace-separated words in a text body.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}
