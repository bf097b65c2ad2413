//! Data model threaded through a resolution: candidates, per-engine name
//! sightings, the run state and the terminal [`Resolution`].

use rolecall_search::SearchHit;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Error text for blank company or designation.
pub const INVALID_INPUT_MESSAGE: &str = "Company and designation are required";

/// Error text when a run completes without any candidate.
pub const NO_RESULT_MESSAGE: &str = "No verified results found";

/// Case-insensitive, trimmed identity of a person name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A person inferred from search hits.
///
/// Created during extraction. Extraction and cross-validation may flip
/// `cross_engine_validated`; scoring fills the two score fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub designation: String,
    /// Link of the first hit the name was extracted from.
    pub source_url: String,
    /// Engine of that first hit.
    pub source_engine: String,
    /// URL-based trust in `[0, 1]`.
    pub source_credibility: f64,
    /// The name was also extracted from another engine's hits.
    pub cross_engine_validated: bool,
    /// Language model confirmation in `[0, 1]`; 0.0 until confirmed.
    pub designation_match_score: f64,
    /// Composite confidence in `[0, 1]`, filled by the scorer.
    pub confidence_score: f64,
}

impl Candidate {
    /// Build a candidate, splitting `full_name` on whitespace into the first
    /// token and the remainder.
    pub fn new(
        full_name: &str,
        company: &str,
        designation: &str,
        hit: &SearchHit,
        source_credibility: f64,
    ) -> Self {
        let full_name = full_name.trim();
        let mut parts = full_name.split_whitespace();
        let first_name = parts.next().unwrap_or_default().to_owned();
        let last_name = parts.collect::<Vec<_>>().join(" ");

        Self {
            full_name: full_name.to_owned(),
            first_name,
            last_name,
            company: company.to_owned(),
            designation: designation.to_owned(),
            source_url: hit.link.clone(),
            source_engine: hit.source_engine.clone(),
            source_credibility: source_credibility.clamp(0.0, 1.0),
            cross_engine_validated: false,
            designation_match_score: 0.0,
            confidence_score: 0.0,
        }
    }

    /// Identity used for deduplication and cross-validation.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.full_name)
    }
}

/// Normalized names each engine's hits produced during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSightings {
    by_engine: BTreeMap<String, BTreeSet<String>>,
}

impl EngineSightings {
    /// Record that `engine`'s hits yielded `name`.
    pub fn record(&mut self, engine: &str, name: &str) {
        self.by_engine
            .entry(engine.to_owned())
            .or_default()
            .insert(normalize_name(name));
    }

    /// True if an engine other than `engine` yielded `name`.
    pub fn seen_by_other_engine(&self, name: &str, engine: &str) -> bool {
        let key = normalize_name(name);
        self.by_engine
            .iter()
            .any(|(other, names)| other != engine && names.contains(&key))
    }

    #[cfg(test)]
    pub(crate) fn engine_count(&self) -> usize {
        self.by_engine.len()
    }

    pub fn clear(&mut self) {
        self.by_engine.clear();
    }
}

/// Terminal artifact of a resolution.
///
/// Serialises to the flat JSON shape callers consume: either the person
/// fields or `{"error": ..., "confidence_score": 0.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Found {
        first_name: String,
        last_name: String,
        current_title: String,
        company: String,
        source_url: String,
        confidence_score: f64,
    },
    Failed {
        error: String,
        confidence_score: f64,
    },
}

impl Resolution {
    /// Error payload with confidence 0.0.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Failed {
            error: message.into(),
            confidence_score: 0.0,
        }
    }

    /// The "no verified results" payload.
    pub fn no_result() -> Self {
        Self::error(NO_RESULT_MESSAGE)
    }

    /// Answer built from a scored candidate.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self::Found {
            first_name: candidate.first_name.clone(),
            last_name: candidate.last_name.clone(),
            current_title: candidate.designation.clone(),
            company: candidate.company.clone(),
            source_url: candidate.source_url.clone(),
            confidence_score: candidate.confidence_score,
        }
    }

    pub fn confidence_score(&self) -> f64 {
        match self {
            Self::Found {
                confidence_score, ..
            }
            | Self::Failed {
                confidence_score, ..
            } => *confidence_score,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Error message for a failed resolution.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Found { .. } => None,
        }
    }

    /// Whether `self` should replace `other` as the best result so far.
    ///
    /// Higher confidence wins; on a tie an answer beats an error payload and
    /// otherwise the earlier result stays.
    pub fn is_better_than(&self, other: &Resolution) -> bool {
        let (mine, theirs) = (self.confidence_score(), other.confidence_score());
        mine > theirs || (mine == theirs && other.is_error() && !self.is_error())
    }
}

/// Mutable record owned by one pipeline run.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    pub company: String,
    pub designation: String,
    /// Planned queries for the current pass.
    pub queries: Vec<String>,
    /// Merged, deduplicated hits of the current pass.
    pub hits: Vec<SearchHit>,
    /// Candidates of the current pass, unique by normalized name.
    pub candidates: Vec<Candidate>,
    /// Per-engine name sightings of the current pass.
    pub sightings: EngineSightings,
    /// Broadened retries performed so far.
    pub retry_count: u32,
    /// Best result across all passes so far.
    pub final_result: Option<Resolution>,
}

impl ResolutionState {
    pub fn new(company: impl Into<String>, designation: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            designation: designation.into(),
            queries: Vec::new(),
            hits: Vec::new(),
            candidates: Vec::new(),
            sightings: EngineSightings::default(),
            retry_count: 0,
            final_result: None,
        }
    }

    /// Drop everything a pass produced, keeping inputs, the retry counter and
    /// the best result so far.
    pub fn reset_pass(&mut self) {
        self.queries.clear();
        self.hits.clear();
        self.candidates.clear();
        self.sightings.clear();
    }

    /// Keep `result` if it beats the best result so far.
    pub fn offer_result(&mut self, result: Resolution) {
        let replace = match self.final_result {
            Some(ref best) => result.is_better_than(best),
            None => true,
        };
        if replace {
            self.final_result = Some(result);
        }
    }

    /// Confidence of the best result so far, 0.0 when there is none.
    pub fn best_confidence(&self) -> f64 {
        self.final_result
            .as_ref()
            .map_or(0.0, Resolution::confidence_score)
    }
}
