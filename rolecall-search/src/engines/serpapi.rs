//! SerpAPI engine: Google organic results through the SerpAPI JSON API.
//!
//! Needs an API key (`SearchConfig::serpapi_api_key`). The key travels in
//! the query string, so request errors are reported without their URL.

use crate::client::SearchClient;
use crate::error::SearchError;
use crate::types::{SearchEngine, SearchHit};
use serde::Deserialize;

/// Error text SerpAPI returns (with HTTP 200) when Google had no results.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Query SerpAPI's Google engine for at most `limit` organic results.
pub(crate) async fn search(
    client: &SearchClient,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let config = client.config();
    let api_key = config.require_serpapi_key()?;
    tracing::trace!(query, "SerpAPI search");

    let endpoint = format!("{}/search", config.serpapi_base_url.trim_end_matches('/'));
    let num = limit.to_string();

    let mut params = vec![
        ("engine", "google"),
        ("q", query),
        ("api_key", api_key),
        ("num", num.as_str()),
    ];
    if config.safe_search {
        params.push(("safe", "active"));
    }

    let body = client
        .get(&endpoint)
        .query(&params)
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest("SerpAPI request failed", e))?
        .error_for_status()
        .map_err(|e| SearchError::from_reqwest("SerpAPI HTTP error", e))?
        .text()
        .await
        .map_err(|e| SearchError::from_reqwest("SerpAPI response read failed", e))?;

    tracing::trace!(bytes = body.len(), "SerpAPI response received");

    parse_serpapi_json(&body, limit)
}

/// Parse a SerpAPI JSON body into hits.
///
/// Results without a link are skipped. A "no results" error payload is an
/// empty list; any other `error` field is a [`SearchError::Http`].
pub(crate) fn parse_serpapi_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let parsed: SerpApiResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid SerpAPI JSON: {e}")))?;

    if let Some(message) = parsed.error {
        if message.contains(NO_RESULTS_MARKER) {
            tracing::debug!("SerpAPI reported no results");
            return Ok(Vec::new());
        }
        return Err(SearchError::Http(format!("SerpAPI error: {message}")));
    }

    let hits: Vec<SearchHit> = parsed
        .organic_results
        .into_iter()
        .filter(|r| !r.link.trim().is_empty())
        .take(max_results)
        .map(|r| {
            SearchHit::new(
                r.title.trim(),
                r.link.trim(),
                r.snippet.trim(),
                SearchEngine::SerpApi.name(),
            )
        })
        .collect();

    tracing::debug!(count = hits.len(), "SerpAPI results parsed");
    Ok(hits)
}
