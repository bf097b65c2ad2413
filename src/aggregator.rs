//! Multi-provider search aggregation.
//!
//! Issues the first few planned queries to every provider (rate-limited per
//! provider), then merges all hits and deduplicates them by normalized link.

use crate::rate_limit::ProviderRateLimiter;
use async_trait::async_trait;
use rolecall_search::{SearchClient, SearchEngine, SearchHit};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// A search capability that never fails past its own boundary.
///
/// Implementations return an empty list on any internal failure.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable provider name; used as the hit tag and the rate-limiter key.
    fn name(&self) -> &str;

    /// Up to `limit` hits for `query`, in engine order.
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit>;
}

/// [`SearchProvider`] backed by one of the `rolecall-search` engines.
///
/// Providers built from clones of one [`SearchClient`] share its connection
/// pool.
#[derive(Debug, Clone)]
pub struct EngineProvider {
    engine: SearchEngine,
    client: SearchClient,
}

impl EngineProvider {
    pub fn new(engine: SearchEngine, client: SearchClient) -> Self {
        Self { engine, client }
    }
}

#[async_trait]
impl SearchProvider for EngineProvider {
    fn name(&self) -> &str {
        self.engine.name()
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        match self.client.search(self.engine, query, limit).await {
            Ok(hits) => {
                tracing::debug!(provider = self.engine.name(), count = hits.len(), "provider returned hits");
                hits
            }
            Err(e) => {
                tracing::warn!(provider = self.engine.name(), error = %e, "search provider failed");
                Vec::new()
            }
        }
    }
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    /// Merged, deduplicated hits.
    pub hits: Vec<SearchHit>,
    /// Raw hit count per provider, before deduplication.
    pub per_provider: BTreeMap<String, usize>,
    /// Queries actually issued.
    pub queries_issued: usize,
}

/// Runs queries against every provider and merges the results.
pub struct SearchAggregator {
    providers: Vec<Arc<dyn SearchProvider>>,
    limiter: Arc<ProviderRateLimiter>,
    queries_per_run: usize,
    results_per_query: usize,
}

impl SearchAggregator {
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        limiter: Arc<ProviderRateLimiter>,
        queries_per_run: usize,
        results_per_query: usize,
    ) -> Self {
        Self {
            providers,
            limiter,
            queries_per_run,
            results_per_query,
        }
    }

    /// Issue at most `queries_per_run` of `queries` to every provider.
    ///
    /// Calls are sequential. An empty result is a valid outcome.
    pub async fn aggregate(&self, queries: &[String]) -> AggregateOutcome {
        let issued = &queries[..queries.len().min(self.queries_per_run)];
        let mut per_provider_hits: Vec<Vec<SearchHit>> = vec![Vec::new(); self.providers.len()];

        for query in issued {
            tracing::debug!(query = query.as_str(), "issuing query");
            for (provider, bucket) in self.providers.iter().zip(per_provider_hits.iter_mut()) {
                self.limiter.acquire(provider.name()).await;
                let hits = provider.search(query, self.results_per_query).await;
                bucket.extend(hits.into_iter().map(|mut hit| {
                    hit.source_engine = provider.name().to_owned();
                    hit
                }));
            }
        }

        let per_provider: BTreeMap<String, usize> = self
            .providers
            .iter()
            .zip(&per_provider_hits)
            .map(|(p, hits)| (p.name().to_owned(), hits.len()))
            .collect();

        let hits = merge_hits(per_provider_hits.into_iter().flatten());

        tracing::info!(
            queries = issued.len(),
            per_provider = ?per_provider,
            merged = hits.len(),
            "search aggregation complete"
        );

        AggregateOutcome {
            hits,
            per_provider,
            queries_issued: issued.len(),
        }
    }
}

/// Keep the first hit per normalized link, dropping hits without a link.
pub fn merge_hits(hits: impl IntoIterator<Item = SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| {
            let key = hit.dedup_key();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}
