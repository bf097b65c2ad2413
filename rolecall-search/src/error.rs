//! Error types for the rolecall-search crate.
//!
//! Messages are stable and never include API keys or full request URLs
//! (SerpAPI carries its key in the query string).

/// Errors that can occur while querying an engine or fetching a page.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// An HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or incomplete configuration (for example a missing API key).
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Classify a `reqwest` failure, keeping timeouts distinct from other
    /// transport errors.
    ///
    /// The URL is stripped from the underlying error so query-string secrets
    /// never reach logs.
    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for rolecall-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
