//! Core types: search hits, engine identity, extracted page text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw result record returned by a search engine.
///
/// Immutable once produced. Two hits are considered the same page when their
/// [`SearchHit::dedup_key`] values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Title of the result page.
    pub title: String,
    /// Result URL as returned by the engine.
    pub link: String,
    /// Text snippet shown by the engine.
    pub snippet: String,
    /// Name of the engine (or provider) that produced this hit.
    pub source_engine: String,
}

impl SearchHit {
    /// Build a hit tagged with the given engine name.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
        source_engine: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            source_engine: source_engine.into(),
        }
    }

    /// Identity used for deduplication: the link with trailing slashes
    /// removed, lower-cased. Empty for hits without a link.
    pub fn dedup_key(&self) -> String {
        normalize_link(&self.link)
    }
}

/// Normalise a result link for deduplication.
///
/// Surrounding whitespace and trailing slashes are removed and the whole
/// string is lower-cased, so `https://Acme.com/About/` and
/// `https://acme.com/about` compare equal.
pub fn normalize_link(link: &str) -> String {
    link.trim().trim_end_matches('/').to_lowercase()
}

/// Search engines this crate can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Google results through the SerpAPI JSON API (needs an API key).
    SerpApi,
    /// DuckDuckGo HTML endpoint, no key required.
    DuckDuckGo,
}

impl SearchEngine {
    /// Stable engine name, used as the `source_engine` tag on hits and as the
    /// rate-limiter key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SerpApi => "serpapi",
            Self::DuckDuckGo => "duckduckgo",
        }
    }

    /// All engines, in the order the pipeline queries them by default.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::SerpApi, Self::DuckDuckGo]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Readable text extracted from a fetched web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// Page title from `<title>`, empty when absent.
    pub title: String,
    /// Boilerplate-free text with whitespace collapsed.
    pub text: String,
    /// Number of whitespace-separated words in `text`.
    pub word_count: usize,
}
