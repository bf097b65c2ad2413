//! Source credibility, designation confirmation and composite confidence.

use crate::config::ScoringConfig;
use crate::llm::NameOracle;
use crate::types::{Candidate, Resolution, ResolutionState};
use regex::Regex;
use rolecall_search::SearchHit;
use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

/// Credibility of a URL matching none of the rules.
pub const DEFAULT_CREDIBILITY: f64 = 0.6;

/// URL rules, first match wins.
static CREDIBILITY_RULES: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"(?i)(\.gov|official|investor)", 0.9),
        (r"(?i)linkedin\.com", 0.85),
        (r"(?i)wikipedia\.org", 0.8),
        (r"(?i)(reuters|bloomberg|cnbc|bbc|nytimes|forbes|wsj)", 0.75),
    ]
    .into_iter()
    .map(|(pattern, score)| {
        #[allow(clippy::expect_used)]
        let re = Regex::new(pattern).expect("credibility pattern is valid");
        (re, score)
    })
    .collect()
});

/// Trust in a source URL, in `[0, 1]`.
pub fn source_credibility(url: &str) -> f64 {
    CREDIBILITY_RULES
        .iter()
        .find(|(re, _)| re.is_match(url))
        .map_or(DEFAULT_CREDIBILITY, |(_, score)| *score)
}

/// Weighted confidence, clamped to `[0, 1]` and rounded to four decimals.
pub fn composite_confidence(
    source_credibility: f64,
    cross_engine_validated: bool,
    designation_match: f64,
    weights: &ScoringConfig,
) -> f64 {
    let cross = if cross_engine_validated { 1.0 } else { 0.0 };
    let raw = source_credibility * weights.credibility_weight
        + cross * weights.cross_engine_weight
        + designation_match * weights.designation_weight;
    (raw.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}

/// Title and snippet of every hit mentioning `name` (case-insensitive),
/// space-joined.
pub fn confirmation_context(name: &str, hits: &[SearchHit]) -> String {
    let needle = name.to_lowercase();
    hits.iter()
        .map(|hit| format!("{} {}", hit.title, hit.snippet))
        .filter(|text| text.to_lowercase().contains(&needle))
        .collect::<Vec<_>>()
        .join(" ")
}

fn by_confidence_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Confirms the leading candidates and ranks all of them.
pub struct ConfidenceScorer {
    oracle: Arc<dyn NameOracle>,
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(oracle: Arc<dyn NameOracle>, config: ScoringConfig) -> Self {
        Self { oracle, config }
    }

    /// Score `state.candidates` in place, sort them by confidence and return
    /// the pass result.
    ///
    /// Candidates are first ordered by confidence without the designation
    /// term; the first `confirm_top_n` of that order are confirmed with the
    /// oracle and the rest keep a designation match of 0.0. Ties keep
    /// extraction order.
    pub async fn score(&self, state: &mut ResolutionState) -> Resolution {
        if state.candidates.is_empty() {
            return Resolution::no_result();
        }

        let provisional = |c: &Candidate| {
            composite_confidence(c.source_credibility, c.cross_engine_validated, 0.0, &self.config)
        };
        state
            .candidates
            .sort_by(|a, b| by_confidence_desc(provisional(a), provisional(b)));

        let confirm = self.config.confirm_top_n.min(state.candidates.len());
        for candidate in state.candidates.iter_mut().take(confirm) {
            let context = confirmation_context(&candidate.full_name, &state.hits);
            let score = self
                .oracle
                .confirm_designation(
                    &candidate.full_name,
                    &state.company,
                    &state.designation,
                    &context,
                )
                .await;
            candidate.designation_match_score = score.clamp(0.0, 1.0);
        }

        for candidate in &mut state.candidates {
            candidate.confidence_score = composite_confidence(
                candidate.source_credibility,
                candidate.cross_engine_validated,
                candidate.designation_match_score,
                &self.config,
            );
        }
        state
            .candidates
            .sort_by(|a, b| by_confidence_desc(a.confidence_score, b.confidence_score));

        tracing::debug!(confirmed = confirm, total = state.candidates.len(), "candidates scored");

        state
            .candidates
            .first()
            .map_or_else(Resolution::no_result, Resolution::from_candidate)
    }
}
