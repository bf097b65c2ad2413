//! Search engine backends.
//!
//! Each module exposes a `search(client, query, limit)` function that
//! [`crate::SearchClient::search`] dispatches to, plus the pure response
//! parser it is built on.

pub mod duckduckgo;
pub mod serpapi;
