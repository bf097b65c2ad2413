//! Page fetching: download a URL and return its readable text.

use crate::client::SearchClient;
use crate::content;
use crate::error::{Result, SearchError};
use crate::types::PageContent;
use url::Url;

/// Fetch `url` and extract at most `max_chars` characters of readable text.
///
/// Only `http`/`https` URLs are fetched. HTML, plain-text and PDF bodies are
/// supported; other content types (images, archives) are rejected.
///
/// # Errors
///
/// - [`SearchError::Config`] for a malformed URL or unsupported scheme.
/// - [`SearchError::Http`] / [`SearchError::Timeout`] for transport failures
///   and non-success statuses.
/// - [`SearchError::Parse`] for unsupported content, an unreadable PDF or an
///   empty page.
pub async fn fetch_page_content(
    client: &SearchClient,
    url: &str,
    max_chars: usize,
) -> Result<PageContent> {
    let parsed = Url::parse(url).map_err(|e| SearchError::Config(format!("invalid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SearchError::Config(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    tracing::trace!(url, "fetching page");

    let response = client
        .get(parsed)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,text/plain;q=0.9,application/pdf;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest("page request failed", e))?
        .error_for_status()
        .map_err(|e| SearchError::from_reqwest("page HTTP error", e))?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_ascii_lowercase();

    let kind = ContentKind::from_content_type(&content_type).ok_or_else(|| {
        SearchError::Parse(format!("unsupported content type: {content_type}"))
    })?;

    match kind {
        ContentKind::Html | ContentKind::PlainText => {
            let body = response
                .text()
                .await
                .map_err(|e| SearchError::from_reqwest("page body read failed", e))?;
            tracing::trace!(url, bytes = body.len(), "page received");
            if kind == ContentKind::Html {
                content::extract_content_with_limit(&body, url, max_chars)
            } else {
                content::plain_text_content(&body, url, max_chars)
            }
        }
        ContentKind::Pdf => {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| SearchError::from_reqwest("PDF body read failed", e))?;
            tracing::trace!(url, bytes = bytes.len(), "PDF received");
            let text = pdf_text(bytes.to_vec()).await?;
            content::plain_text_content(&text, url, max_chars)
        }
    }
}

/// Text layer of a PDF document.
///
/// Parsing is CPU-bound and the parser can panic on malformed files, so it
/// runs on the blocking pool; a panic surfaces as a parse error.
async fn pdf_text(bytes: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| SearchError::Parse(format!("PDF parser aborted: {e}")))?
        .map_err(|e| SearchError::Parse(format!("unreadable PDF: {e:?}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Html,
    PlainText,
    Pdf,
}

impl ContentKind {
    fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim();
        match mime {
            "text/html" | "application/xhtml+xml" | "" => Some(Self::Html),
            "text/plain" => Some(Self::PlainText),
            "application/pdf" | "application/x-pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}
