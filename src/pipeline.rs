//! The resolution state machine.
//!
//! `Search → Validate → Score → RetryCheck → (Search | Done)`. A pass that
//! leaves the best confidence below the threshold is re-run once with the
//! broadened query set; the best result across passes is returned.

use crate::aggregator::SearchAggregator;
use crate::config::PipelineConfig;
use crate::extract::CandidateExtractor;
use crate::planner::QueryPlanner;
use crate::scoring::ConfidenceScorer;
use crate::types::{Resolution, ResolutionState};
use crate::validate::cross_validate;
use tokio::sync::watch;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Validate,
    Score,
    RetryCheck,
    Done,
}

/// Drives one resolution through its stages.
pub struct PipelineController {
    planner: QueryPlanner,
    aggregator: SearchAggregator,
    extractor: CandidateExtractor,
    scorer: ConfidenceScorer,
    config: PipelineConfig,
    best_tx: Option<watch::Sender<Option<Resolution>>>,
}

impl PipelineController {
    pub fn new(
        aggregator: SearchAggregator,
        extractor: CandidateExtractor,
        scorer: ConfidenceScorer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            planner: QueryPlanner,
            aggregator,
            extractor,
            scorer,
            config,
            best_tx: None,
        }
    }

    /// Publish the best result after every scored pass.
    ///
    /// The receiver outlives the run, so a caller that aborts a slow retry
    /// still holds the earlier pass's answer.
    #[must_use]
    pub fn with_best_result_sender(mut self, tx: watch::Sender<Option<Resolution>>) -> Self {
        self.best_tx = Some(tx);
        self
    }

    /// Run to completion and return the best result across passes.
    ///
    /// Plans first-pass queries when `state.queries` is empty.
    pub async fn run(&self, state: &mut ResolutionState) -> Resolution {
        if state.queries.is_empty() {
            state.queries = self.planner.plan(&state.company, &state.designation);
        }

        let mut stage = Stage::Search;
        while stage != Stage::Done {
            stage = match stage {
                Stage::Search => {
                    self.search(state).await;
                    Stage::Validate
                }
                Stage::Validate => {
                    let validated = cross_validate(&mut state.candidates, &state.sightings);
                    let ratio = if state.candidates.is_empty() {
                        0.0
                    } else {
                        validated as f64 / state.candidates.len() as f64
                    };
                    tracing::info!(
                        pass = state.retry_count + 1,
                        validated,
                        candidates = state.candidates.len(),
                        ratio,
                        "cross-engine validation complete"
                    );
                    Stage::Score
                }
                Stage::Score => {
                    let result = self.scorer.score(state).await;
                    tracing::info!(
                        pass = state.retry_count + 1,
                        confidence = result.confidence_score(),
                        found = !result.is_error(),
                        "pass scored"
                    );
                    state.offer_result(result);
                    if let Some(tx) = &self.best_tx {
                        tx.send_replace(state.final_result.clone());
                    }
                    Stage::RetryCheck
                }
                Stage::RetryCheck => self.retry_check(state),
                Stage::Done => Stage::Done,
            };
        }

        let result = state.final_result.clone().unwrap_or_else(Resolution::no_result);
        tracing::info!(
            passes = state.retry_count + 1,
            confidence = result.confidence_score(),
            "resolution complete"
        );
        result
    }

    async fn search(&self, state: &mut ResolutionState) {
        tracing::info!(
            pass = state.retry_count + 1,
            planned = state.queries.len(),
            "searching"
        );
        let outcome = self.aggregator.aggregate(&state.queries).await;
        state.hits = outcome.hits;
        self.extractor.extract(state).await;
    }

    fn retry_check(&self, state: &mut ResolutionState) -> Stage {
        let best = state.best_confidence();
        if best < self.config.confidence_threshold && state.retry_count < self.config.max_retries {
            tracing::info!(
                best,
                threshold = self.config.confidence_threshold,
                "confidence below threshold, retrying with broadened queries"
            );
            state.reset_pass();
            state.queries = self.planner.broadened(&state.company, &state.designation);
            state.retry_count += 1;
            Stage::Search
        } else {
            Stage::Done
        }
    }
}
