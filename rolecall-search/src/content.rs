//! HTML content extraction: drops boilerplate and returns readable text.
//!
//! The document is parsed once and walked from the main content root,
//! skipping subtrees of non-content elements (scripts, navigation, forms).
//! Output is whitespace-collapsed text suitable for name extraction.

use crate::error::{Result, SearchError};
use crate::types::PageContent;
use scraper::{ElementRef, Html, Selector};

/// Default maximum characters to return from extracted content.
pub const DEFAULT_MAX_CHARS: usize = 5_000;

/// Elements whose whole subtree is never part of the readable text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "form",
    "template", "button",
];

/// Elements that start a new line in the extracted text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "br", "tr",
    "table", "blockquote", "dd", "dt",
];

/// Content roots, most specific first.
const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Extract readable text content from raw HTML.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    extract_content_with_limit(html, url, DEFAULT_MAX_CHARS)
}

/// Extract readable text content from raw HTML, keeping at most `max_chars`
/// characters.
///
/// Falls back to the `description` meta tag when the body has no text.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content_with_limit(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let mut text = normalise_whitespace(&extract_main_text(&document));
    if text.is_empty() {
        text = normalise_whitespace(&extract_meta_description(&document));
    }
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    let text = truncate_chars(&text, max_chars);
    let word_count = text.split_whitespace().count();

    Ok(PageContent {
        url: url.to_owned(),
        title,
        text,
        word_count,
    })
}

/// Normalise a plain-text body the same way HTML text is normalised.
pub fn plain_text_content(body: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let text = normalise_whitespace(body);
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }
    let text = truncate_chars(&text, max_chars);
    let word_count = text.split_whitespace().count();
    Ok(PageContent {
        url: url.to_owned(),
        title: String::new(),
        text,
        word_count,
    })
}

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

fn extract_meta_description(document: &Html) -> String {
    let Ok(selector) = Selector::parse(
        "meta[name=\"description\"], meta[property=\"og:description\"]",
    ) else {
        return String::new();
    };
    document
        .select(&selector)
        .find_map(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_owned()
}

/// Text of the first content root that yields anything.
fn extract_main_text(document: &Html) -> String {
    for selector_str in CONTENT_ROOTS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let mut text = String::new();
            collect_text(element, &mut text);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }

    String::new()
}

/// Depth-first text collection that prunes boilerplate subtrees.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            let is_block = BLOCK_TAGS.contains(&name);
            if is_block {
                out.push('\n');
            }
            collect_text(child_el, out);
            if is_block {
                out.push('\n');
            } else {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// Collapse excess whitespace: runs of spaces become one, blank-line runs
/// become a single blank line, every line is trimmed.
fn normalise_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = false;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !blank_run && !lines.is_empty() {
                lines.push(String::new());
            }
            blank_run = true;
        } else {
            lines.push(collapsed);
            blank_run = false;
        }
    }

    lines.join("\n").trim().to_owned()
}

/// Keep at most `max_chars` characters, cutting on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_owned(),
        None => text.to_owned(),
    }
}
