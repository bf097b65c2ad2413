//! Rolecall: find who holds a designation at a company.
//!
//! Given a company and a designation ("Acme", "CTO"), the resolver searches
//! several engines, extracts person names from the hits, cross-checks them
//! between engines, scores each candidate and returns the best one.
//!
//! # Architecture
//!
//! A run is a small state machine over one [`types::ResolutionState`]:
//! - **Planning**: designation aliases expanded into search queries
//! - **Aggregation**: every query sent to every provider, hits deduplicated
//! - **Extraction**: names from titles, snippets and scraped pages
//! - **Validation**: names seen by more than one engine are flagged
//! - **Scoring**: source credibility, cross-engine agreement and a language
//!   model confirmation combined into one confidence
//! - **Retry**: a low-confidence pass is repeated once with broader queries
//!
//! Collaborator failures (search engines, page fetches, model calls) are
//! absorbed where they happen. Callers get a [`Resolution`], never an error.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod planner;
pub mod rate_limit;
pub mod scoring;
pub mod types;
pub mod validate;

pub use aggregator::{EngineProvider, SearchProvider};
pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use extract::{HttpPageFetcher, PageFetcher};
pub use llm::{ChatOracle, DisabledOracle, NameOracle};
pub use rate_limit::ProviderRateLimiter;
pub use types::{Candidate, Resolution, ResolutionState};

use aggregator::SearchAggregator;
use config::SecretRef;
use extract::CandidateExtractor;
use llm::{BudgetedOracle, ChatClient};
use pipeline::PipelineController;
use rolecall_search::SearchClient;
use scoring::ConfidenceScorer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use types::INVALID_INPUT_MESSAGE;

/// Entry point for resolutions.
///
/// Cheap to share: resolutions borrow it immutably and run on their own
/// tasks. The rate limiter is the only state shared between them.
pub struct Resolver {
    config: Arc<ResolverConfig>,
    providers: Vec<Arc<dyn SearchProvider>>,
    fetcher: Arc<dyn PageFetcher>,
    oracle: Arc<dyn NameOracle>,
    limiter: Arc<ProviderRateLimiter>,
}

impl Resolver {
    /// Build a resolver with the HTTP-backed engines, page fetcher and
    /// (when enabled and keyed) chat-model oracle.
    ///
    /// A missing API key is not fatal: SerpAPI then contributes no hits and
    /// the model oracle is replaced by [`DisabledOracle`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] for an invalid configuration,
    /// [`ResolveError::Search`] if the HTTP pool cannot be built and
    /// [`ResolveError::Llm`] if the chat client cannot be built.
    pub fn from_config(config: ResolverConfig) -> Result<Self> {
        config.validate()?;

        let serpapi_key = resolve_optional_secret("SerpAPI", &config.search.serpapi_api_key);
        let client = SearchClient::new(config.search.to_search_config(serpapi_key))?;

        let providers: Vec<Arc<dyn SearchProvider>> = config
            .search
            .engines
            .iter()
            .map(|engine| {
                Arc::new(EngineProvider::new(*engine, client.clone())) as Arc<dyn SearchProvider>
            })
            .collect();

        let fetcher = Arc::new(HttpPageFetcher::new(
            client,
            config.extraction.page_max_chars,
        ));

        let oracle: Arc<dyn NameOracle> = if config.llm.enabled {
            match resolve_optional_secret("LLM", &config.llm.api_key) {
                Some(key) => {
                    let client = ChatClient::new(&config.llm, key)?;
                    tracing::info!(model = client.model(), "language model oracle enabled");
                    Arc::new(ChatOracle::new(
                        client,
                        config.extraction.llm_text_max_chars,
                        config.scoring.confirm_context_max_chars,
                    ))
                }
                None => Arc::new(DisabledOracle),
            }
        } else {
            tracing::info!("language model oracle disabled by config");
            Arc::new(DisabledOracle)
        };

        Ok(Self::new(config, providers, fetcher, oracle))
    }

    /// Build a resolver from explicit collaborators.
    pub fn new(
        config: ResolverConfig,
        providers: Vec<Arc<dyn SearchProvider>>,
        fetcher: Arc<dyn PageFetcher>,
        oracle: Arc<dyn NameOracle>,
    ) -> Self {
        let limiter = Arc::new(ProviderRateLimiter::new(Duration::from_millis(
            config.search.min_interval_ms,
        )));
        Self {
            config: Arc::new(config),
            providers,
            fetcher,
            oracle,
            limiter,
        }
    }

    /// Share a rate limiter with other resolvers in the process.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<ProviderRateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `designation` at `company`.
    ///
    /// Never fails: bad input, a timed-out run and internal failures all come
    /// back as an error payload with confidence 0.0.
    pub async fn resolve(&self, company: &str, designation: &str) -> Resolution {
        self.resolve_cancellable(company, designation, CancellationToken::new())
            .await
    }

    /// [`Resolver::resolve`] that stops early when `cancel` fires.
    pub async fn resolve_cancellable(
        &self,
        company: &str,
        designation: &str,
        cancel: CancellationToken,
    ) -> Resolution {
        match self.try_resolve(company, designation, cancel).await {
            Ok(result) => result,
            Err(ResolveError::InvalidInput(message)) => Resolution::error(message),
            Err(e) => {
                tracing::error!(error = %e, "resolution failed");
                Resolution::error(pipeline_error_message(&e))
            }
        }
    }

    /// Run a resolution, surfacing failures as [`ResolveError`].
    ///
    /// Inputs are trimmed; a blank company or designation fails before any
    /// collaborator is contacted.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidInput`] for blank inputs.
    /// - [`ResolveError::Timeout`] when the run exceeds its deadline before
    ///   any pass was scored. A deadline hit during the retry returns the
    ///   first pass's result instead.
    /// - [`ResolveError::Cancelled`] when `cancel` fires first.
    /// - [`ResolveError::Pipeline`] when the run task panics.
    pub async fn try_resolve(
        &self,
        company: &str,
        designation: &str,
        cancel: CancellationToken,
    ) -> Result<Resolution> {
        let company = company.trim();
        let designation = designation.trim();
        if company.is_empty() || designation.is_empty() {
            return Err(ResolveError::InvalidInput(INVALID_INPUT_MESSAGE.to_owned()));
        }

        tracing::info!(company, designation, "resolution started");

        let (best_tx, best_rx) = watch::channel(None);
        let controller = self.controller().with_best_result_sender(best_tx);
        let mut state = ResolutionState::new(company, designation);
        let mut handle = tokio::spawn(async move { controller.run(&mut state).await });

        let deadline_secs = self.config.pipeline.run_timeout_seconds;
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                handle.abort();
                Err(ResolveError::Cancelled)
            }
            joined = tokio::time::timeout(Duration::from_secs(deadline_secs), &mut handle) => {
                match joined {
                    Ok(Ok(result)) => Ok(result),
                    Ok(Err(e)) => Err(ResolveError::Pipeline(describe_join_error(e))),
                    Err(_) => {
                        handle.abort();
                        let kept = best_rx.borrow().clone();
                        match kept {
                            Some(best) => {
                                tracing::warn!(
                                    deadline_secs,
                                    confidence = best.confidence_score(),
                                    "run timed out, returning best result so far"
                                );
                                Ok(best)
                            }
                            None => Err(ResolveError::Timeout(deadline_secs)),
                        }
                    }
                }
            }
        }
    }

    /// Per-run pipeline with a fresh model-call budget.
    fn controller(&self) -> PipelineController {
        let config = &self.config;
        let oracle: Arc<dyn NameOracle> = Arc::new(BudgetedOracle::new(
            Arc::clone(&self.oracle),
            config.pipeline.llm_call_budget,
        ));

        PipelineController::new(
            SearchAggregator::new(
                self.providers.clone(),
                Arc::clone(&self.limiter),
                config.pipeline.queries_per_run,
                config.search.results_per_query,
            ),
            CandidateExtractor::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&oracle),
                config.extraction.max_hits,
                config.extraction.max_scraped_pages,
            ),
            ConfidenceScorer::new(oracle, config.scoring.clone()),
            config.pipeline.clone(),
        )
    }
}

/// Resolve a secret, logging and dropping it when unavailable.
fn resolve_optional_secret(label: &str, secret: &SecretRef) -> Option<String> {
    match secret.resolve() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(secret = label, error = %e, "secret unavailable, continuing without it");
            None
        }
    }
}

fn pipeline_error_message(error: &ResolveError) -> String {
    match error {
        ResolveError::Pipeline(detail) => format!("Pipeline error: {detail}"),
        other => format!("Pipeline error: {other}"),
    }
}

fn describe_join_error(error: JoinError) -> String {
    if error.is_cancelled() {
        return "run task was cancelled".to_owned();
    }
    match error.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "run task panicked".to_owned()),
        Err(e) => e.to_string(),
    }
}
