//! Pooled HTTP client shared by the engines and the page fetcher.
//!
//! A [`SearchClient`] is built once per resolver and cloned freely; clones
//! share one connection pool and cookie jar. The User-Agent is chosen per
//! request so a long-lived client still rotates it.

use crate::config::SearchConfig;
use crate::engines::{duckduckgo, serpapi};
use crate::error::{Result, SearchError};
use crate::fetch;
use crate::types::{PageContent, SearchEngine, SearchHit};
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::{IntoUrl, RequestBuilder};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Browser User-Agent strings used when no override is configured.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

const MAX_REDIRECTS: usize = 10;

/// Engine queries and page fetches over one pooled connection set.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: Arc<SearchConfig>,
}

impl SearchClient {
    /// Validate `config` and build the underlying pool.
    ///
    /// A missing SerpAPI key is not an error here; SerpAPI queries fail with
    /// [`SearchError::Config`] instead.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for an invalid configuration and
    /// [`SearchError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Query `engine` for at most `limit` hits (further capped by
    /// `max_results`), each tagged with the engine's name.
    ///
    /// # Errors
    ///
    /// The engine's transport, status or parse error, or
    /// [`SearchError::Config`] when SerpAPI has no key.
    pub async fn search(
        &self,
        engine: SearchEngine,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let limit = limit.min(self.config.max_results);
        if limit == 0 {
            return Ok(Vec::new());
        }
        match engine {
            SearchEngine::SerpApi => serpapi::search(self, query, limit).await,
            SearchEngine::DuckDuckGo => duckduckgo::search(self, query, limit).await,
        }
    }

    /// Download `url` and return at most `max_chars` characters of readable
    /// text. HTML, plain text and PDF bodies are supported.
    ///
    /// # Errors
    ///
    /// See [`fetch::fetch_page_content`].
    pub async fn fetch_page(&self, url: &str, max_chars: usize) -> Result<PageContent> {
        fetch::fetch_page_content(self, url, max_chars).await
    }

    pub(crate) fn get(&self, url: impl IntoUrl) -> RequestBuilder {
        self.http.get(url).header(USER_AGENT, self.user_agent())
    }

    pub(crate) fn post(&self, url: impl IntoUrl) -> RequestBuilder {
        self.http.post(url).header(USER_AGENT, self.user_agent())
    }

    fn user_agent(&self) -> &str {
        match self.config.user_agent {
            Some(ref custom) => custom.as_str(),
            None => random_user_agent(),
        }
    }
}

impl fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
