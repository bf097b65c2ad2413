//! Page-text fetching for extraction.

use async_trait::async_trait;
use rolecall_search::SearchClient;

/// Downloads a page and returns its readable text.
///
/// Implementations return an empty string on any failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> String;
}

/// [`PageFetcher`] over HTTP with boilerplate stripping.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: SearchClient,
    max_chars: usize,
}

impl HttpPageFetcher {
    pub fn new(client: SearchClient, max_chars: usize) -> Self {
        Self { client, max_chars }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        match self.client.fetch_page(url, self.max_chars).await {
            Ok(page) => page.text,
            Err(e) => {
                tracing::debug!(url, error = %e, "page fetch failed");
                String::new()
            }
        }
    }
}
