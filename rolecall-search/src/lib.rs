//! # rolecall-search
//!
//! Search-engine and page-text adapters for rolecall.
//!
//! ## Design
//!
//! - One pooled [`SearchClient`] per resolver, shared by every engine query
//!   and page fetch
//! - SerpAPI (Google organic results, API key) and DuckDuckGo (HTML scrape,
//!   no key), selected by [`SearchEngine`]
//! - Each call returns its own error; callers decide how to degrade
//! - [`SearchClient::fetch_page`] returns boilerplate-free text from HTML,
//!   plain-text and PDF documents
//! - User-Agent rotation per request
//!
//! ## Security
//!
//! - API keys are redacted from `Debug` output and error messages
//! - Search queries are logged only at trace level
//! - No network listeners: this is a library, not a server
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> rolecall_search::Result<()> {
//! use rolecall_search::{SearchClient, SearchConfig, SearchEngine};
//!
//! let client = SearchClient::new(SearchConfig::default())?;
//! let hits = client.search(SearchEngine::DuckDuckGo, "Acme CEO", 5).await?;
//! for hit in &hits {
//!     println!("{}: {}", hit.title, hit.link);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod content;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod types;

pub use client::SearchClient;
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use types::{PageContent, SearchEngine, SearchHit, normalize_link};
