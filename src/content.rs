//! HTML content extraction: strips boilerplate and returns readable text.
//!
//! Parses raw HTML, removes non-content elements (scripts, styles,
//! navigation), finds the main content area, and returns the page title
//! plus flattened text suitable for embedding.

use crate::error::{Result, SearchError};
use crate::types::PageContent;
use scraper::{Html, Selector};

/// Default maximum bytes of extracted text kept per page.
///
/// Bounds memory on pathological pages; the embedding input is cut far
/// shorter again at graph-build time.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Extract the title and readable text from raw HTML.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn parse_page(html: &str, url: &str) -> Result<PageContent> {
    parse_page_with_limit(html, url, DEFAULT_MAX_CHARS)
}

/// Extract page content with a custom text length cap.
///
/// Same as [`parse_page`] but allows overriding the maximum number of
/// bytes kept from the extracted text.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn parse_page_with_limit(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let cleaned_html = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned_html);

    let title = extract_title(&document);
    let raw_text = extract_main_text(&document);

    let text = flatten_whitespace(&raw_text);
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    Ok(PageContent {
        url: url.to_owned(),
        title,
        text: cap_length(&text, max_chars),
    })
}

/// Extract the page title from the `<title>` element.
///
/// Returns an empty string when the page has no title; pages without
/// titles still rank on their body text.
fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Extract text from the main content area of the document.
///
/// Tries content-specific selectors in priority order, falling back to `<body>`.
fn extract_main_text(document: &Html) -> String {
    let content_selectors = ["article", "main", "[role=\"main\"]", "body"];

    for selector_str in &content_selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }
    }

    String::new()
}

/// Remove boilerplate HTML tags and their content before parsing.
///
/// Strips `<script>`, `<style>`, `<nav>`, `<footer>`, `<header>`, `<aside>`,
/// `<noscript>`, `<svg>`, and `<iframe>` elements including all their content.
fn strip_boilerplate_tags(html: &str) -> String {
    let tags = [
        "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
    ];

    let mut result = html.to_owned();
    for tag in &tags {
        result = strip_tag(&result, tag);
    }
    result
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    // ASCII lowering keeps byte offsets valid for slicing `html`.
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        // Find the next opening tag (case-insensitive).
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // Verify this is actually the target tag (not e.g. <navigate> for <nav>).
        let after_tag = start + open_tag.len();
        if after_tag < lower.len() {
            let next_byte = lower.as_bytes()[after_tag];
            if next_byte != b' '
                && next_byte != b'>'
                && next_byte != b'/'
                && next_byte != b'\n'
                && next_byte != b'\r'
                && next_byte != b'\t'
            {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        // Add everything before this tag.
        result.push_str(&html[pos..start]);

        // Find the matching closing tag.
        let end = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => {
                // No closing tag: skip to the end of the opening tag.
                match lower[start..].find('>') {
                    Some(offset) => start + offset + 1,
                    None => html.len(),
                }
            }
        };

        pos = end;
    }

    result
}

/// Collapse all whitespace runs, including newlines, into single spaces.
///
/// Embedding models see the page as one flat string, so line structure
/// carries no signal worth preserving.
fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap text length in bytes, cutting back to the nearest char boundary.
fn cap_length(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_owned();
    }

    let mut end = max_chars;
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    text[..end].to_owned()
}
