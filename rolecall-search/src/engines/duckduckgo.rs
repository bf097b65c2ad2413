//! DuckDuckGo engine, scraping the HTML-only endpoint.
//!
//! No API key and no JavaScript. Result links are wrapped in a
//! `duckduckgo.com/l/?uddg=` redirect which is unwrapped here.

use crate::client::SearchClient;
use crate::error::SearchError;
use crate::types::{SearchEngine, SearchHit};
use scraper::{Html, Selector};
use url::Url;

/// Post `query` to the HTML endpoint and parse at most `limit` results.
pub(crate) async fn search(
    client: &SearchClient,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let config = client.config();
    tracing::trace!(query, "DuckDuckGo search");

    let mut params = vec![("q", query)];
    if config.safe_search {
        params.push(("kp", "1"));
    }

    let html = client
        .post(&config.duckduckgo_url)
        .form(&params)
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest("DuckDuckGo request failed", e))?
        .error_for_status()
        .map_err(|e| SearchError::from_reqwest("DuckDuckGo HTTP error", e))?
        .text()
        .await
        .map_err(|e| SearchError::from_reqwest("DuckDuckGo response read failed", e))?;

    tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

    parse_duckduckgo_html(&html, limit)
}

/// Resolve a result `href` to its target URL.
///
/// Protocol-relative links get `https:`; `/l/?uddg=` redirects yield the
/// decoded target. Unparseable hrefs yield `None`.
fn unwrap_result_link(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_owned()
    };

    let parsed = Url::parse(&full_href).ok()?;

    let is_redirect = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        && parsed.path().starts_with("/l/");
    if is_redirect {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

/// Parse a DuckDuckGo HTML results page into hits, skipping ads.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(link) = title_el.value().attr("href").and_then(unwrap_result_link)
        else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        hits.push(SearchHit::new(
            title,
            link,
            snippet,
            SearchEngine::DuckDuckGo.name(),
        ));

        if hits.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = hits.len(), "DuckDuckGo results parsed");
    Ok(hits)
}
