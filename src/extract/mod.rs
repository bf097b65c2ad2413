//! Candidate extraction from search hits.
//!
//! For each of the first `max_hits` hits the title, snippet and (for the
//! first `max_scraped_pages` hits) scraped page text are combined, names are
//! pulled out with both the pattern extractor and the oracle, and each name
//! becomes a [`Candidate`] attributed to the first hit that produced it.

pub mod fetcher;
pub mod pattern;

pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use pattern::extract_pattern_names;

use crate::llm::NameOracle;
use crate::scoring::source_credibility;
use crate::types::{Candidate, ResolutionState, normalize_name};
use std::collections::HashSet;
use std::sync::Arc;

/// Turns the current pass's hits into candidates.
pub struct CandidateExtractor {
    fetcher: Arc<dyn PageFetcher>,
    oracle: Arc<dyn NameOracle>,
    max_hits: usize,
    max_scraped_pages: usize,
}

impl CandidateExtractor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        oracle: Arc<dyn NameOracle>,
        max_hits: usize,
        max_scraped_pages: usize,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            max_hits,
            max_scraped_pages,
        }
    }

    /// Populate `state.candidates` and `state.sightings` from `state.hits`.
    ///
    /// A name seen again under a different engine marks the existing
    /// candidate cross-engine validated. Returns the number of candidates.
    pub async fn extract(&self, state: &mut ResolutionState) -> usize {
        let hits: Vec<_> = state.hits.iter().take(self.max_hits).cloned().collect();
        let mut scraped = 0usize;

        for (index, hit) in hits.iter().enumerate() {
            let page_text = if index < self.max_scraped_pages && !hit.link.is_empty() {
                scraped += 1;
                self.fetcher.fetch_text(&hit.link).await
            } else {
                String::new()
            };

            let text = format!("{} {} {}", hit.title, hit.snippet, page_text);
            let names = self.names_in(&text, &state.company, &state.designation).await;
            tracing::debug!(link = hit.link.as_str(), names = names.len(), "extracted names from hit");

            for name in names {
                state.sightings.record(&hit.source_engine, &name);
                let key = normalize_name(&name);
                match state
                    .candidates
                    .iter_mut()
                    .find(|c| c.normalized_name() == key)
                {
                    Some(existing) => {
                        if existing.source_engine != hit.source_engine {
                            existing.cross_engine_validated = true;
                        }
                    }
                    None => state.candidates.push(Candidate::new(
                        &name,
                        &state.company,
                        &state.designation,
                        hit,
                        source_credibility(&hit.link),
                    )),
                }
            }
        }

        tracing::info!(
            hits = hits.len(),
            scraped,
            candidates = state.candidates.len(),
            "candidate extraction complete"
        );
        state.candidates.len()
    }

    /// Pattern names first, then oracle names, exact duplicates dropped.
    ///
    /// Case variants survive here and collapse onto one candidate through
    /// the normalized-name lookup in [`CandidateExtractor::extract`].
    async fn names_in(&self, text: &str, company: &str, designation: &str) -> Vec<String> {
        let mut names = extract_pattern_names(text);
        names.extend(self.oracle.extract_names(text, company, designation).await);

        let mut seen = HashSet::new();
        names
            .into_iter()
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect()
    }
}
