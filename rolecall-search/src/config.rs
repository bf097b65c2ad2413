//! Search client configuration.
//!
//! [`SearchConfig`] is fixed when a [`crate::SearchClient`] is built. It
//! holds timeouts, result caps, the User-Agent override and the endpoints
//! each engine talks to. Endpoints are configurable so tests can point
//! engines at a local mock server.

use std::fmt;

use crate::error::SearchError;

/// Default SerpAPI endpoint root.
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";

/// Default DuckDuckGo HTML-only endpoint.
pub const DEFAULT_DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";

/// Configuration shared by every engine call and page fetch of one client.
#[derive(Clone)]
pub struct SearchConfig {
    /// Upper bound on hits per query, whatever limit the caller asks for.
    pub max_results: usize,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Ask engines that support it to filter adult content.
    pub safe_search: bool,
    /// Custom User-Agent. `None` rotates through built-in browser strings.
    pub user_agent: Option<String>,
    /// SerpAPI key. The SerpAPI engine refuses to run without one.
    pub serpapi_api_key: Option<String>,
    /// SerpAPI endpoint root; `/search` is appended.
    pub serpapi_base_url: String,
    /// DuckDuckGo HTML endpoint.
    pub duckduckgo_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            timeout_seconds: 30,
            safe_search: true,
            user_agent: None,
            serpapi_api_key: None,
            serpapi_base_url: DEFAULT_SERPAPI_BASE_URL.to_owned(),
            duckduckgo_url: DEFAULT_DUCKDUCKGO_URL.to_owned(),
        }
    }
}

// Hand-written so the API key never shows up in debug logs.
impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("max_results", &self.max_results)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("safe_search", &self.safe_search)
            .field("user_agent", &self.user_agent)
            .field(
                "serpapi_api_key",
                &self.serpapi_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("duckduckgo_url", &self.duckduckgo_url)
            .finish()
    }
}

impl SearchConfig {
    /// Validates this configuration.
    ///
    /// `max_results` and `timeout_seconds` must be non-zero and both
    /// endpoints must be non-empty.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.serpapi_base_url.trim().is_empty() {
            return Err(SearchError::Config("serpapi_base_url is empty".into()));
        }
        if self.duckduckgo_url.trim().is_empty() {
            return Err(SearchError::Config("duckduckgo_url is empty".into()));
        }
        Ok(())
    }

    /// Returns the SerpAPI key, or a config error when none is set.
    pub fn require_serpapi_key(&self) -> Result<&str, SearchError> {
        match self.serpapi_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(SearchError::Config("SerpAPI key not configured".into())),
        }
    }
}
