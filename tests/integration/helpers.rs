//! Shared mocks for integration tests: recording search providers, page
//! fetchers and oracles that count their calls.

use async_trait::async_trait;
use rolecall::config::ResolverConfig;
use rolecall::{NameOracle, PageFetcher, Resolver, SearchProvider};
use rolecall_search::SearchHit;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&str) -> Vec<SearchHit> + Send + Sync>;

/// Search provider answering from a closure and recording every query.
pub(crate) struct RecordingProvider {
    name: String,
    responder: Responder,
    delay: Option<Duration>,
    slow_after: Option<(usize, Duration)>,
    panics: bool,
    queries: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub(crate) fn new(
        name: &str,
        responder: impl Fn(&str) -> Vec<SearchHit> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            responder: Box::new(responder),
            delay: None,
            slow_after: None,
            panics: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Provider that returns nothing.
    pub(crate) fn empty(name: &str) -> Self {
        Self::new(name, |_| Vec::new())
    }

    /// Provider returning the same hits for every query.
    pub(crate) fn fixed(name: &str, hits: Vec<SearchHit>) -> Self {
        Self::new(name, move |_| hits.clone())
    }

    /// Sleep before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer the first `calls` queries at once, then sleep before each.
    pub(crate) fn slow_after(mut self, calls: usize, delay: Duration) -> Self {
        self.slow_after = Some((calls, delay));
        self
    }

    /// Panic instead of answering.
    pub(crate) fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for RecordingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let seen = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.to_owned());
            queries.len() - 1
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((calls, delay)) = self.slow_after {
            if seen >= calls {
                tokio::time::sleep(delay).await;
            }
        }
        if self.panics {
            panic!("{} provider exploded", self.name);
        }
        (self.responder)(query).into_iter().take(limit).collect()
    }
}

/// Page fetcher serving fixed text per URL (empty for unknown URLs).
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub(crate) fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_owned(), text.to_owned());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

/// Oracle that "extracts" known names present in the text and confirms from
/// a fixed table.
pub(crate) struct ScriptedOracle {
    known_names: Vec<String>,
    confirmations: HashMap<String, f64>,
    default_confirmation: f64,
    extract_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub(crate) fn new(default_confirmation: f64) -> Self {
        Self {
            known_names: Vec::new(),
            confirmations: HashMap::new(),
            default_confirmation,
            extract_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn knows(mut self, name: &str) -> Self {
        self.known_names.push(name.to_owned());
        self
    }

    pub(crate) fn confirms(mut self, name: &str, score: f64) -> Self {
        self.confirmations.insert(name.to_owned(), score);
        self
    }

    pub(crate) fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.extract_calls() + self.confirm_calls()
    }
}

#[async_trait]
impl NameOracle for ScriptedOracle {
    async fn extract_names(&self, text: &str, _company: &str, _designation: &str) -> Vec<String> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.known_names
            .iter()
            .filter(|name| text.contains(name.as_str()))
            .cloned()
            .collect()
    }

    async fn confirm_designation(
        &self,
        name: &str,
        _company: &str,
        _designation: &str,
        _context: &str,
    ) -> f64 {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.confirmations
            .get(name)
            .copied()
            .unwrap_or(self.default_confirmation)
    }
}

/// Default config without rate-limit waits.
pub(crate) fn test_config() -> ResolverConfig {
    let mut config = ResolverConfig::default();
    config.search.min_interval_ms = 0;
    config
}

pub(crate) fn hit(title: &str, link: &str, snippet: &str) -> SearchHit {
    SearchHit::new(title, link, snippet, "untagged")
}

/// Resolver over the given mocks.
pub(crate) fn resolver(
    config: ResolverConfig,
    providers: &[Arc<RecordingProvider>],
    fetcher: Arc<StaticFetcher>,
    oracle: Arc<ScriptedOracle>,
) -> Resolver {
    let providers = providers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn SearchProvider>)
        .collect();
    Resolver::new(config, providers, fetcher, oracle)
}
