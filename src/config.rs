//! Configuration types for the resolver.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! keys it changes. Secrets are [`SecretRef`]s resolved at startup rather
//! than stored inline.

use crate::error::{ResolveError, Result};
use rolecall_search::{SearchConfig, SearchEngine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Search engines and rate limiting.
    pub search: SearchSettings,
    /// Candidate extraction limits.
    pub extraction: ExtractionConfig,
    /// Confidence composition.
    pub scoring: ScoringConfig,
    /// Retry and cost ceilings.
    pub pipeline: PipelineConfig,
    /// Language model client.
    pub llm: LlmConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Where a secret comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretRef {
    /// No secret.
    #[default]
    None,
    /// Inline literal (discouraged; prefer `env`).
    Literal { value: String },
    /// Read from an environment variable.
    Env { var: String },
}

impl SecretRef {
    /// Shorthand for an environment-variable reference.
    pub fn env(var: impl Into<String>) -> Self {
        Self::Env { var: var.into() }
    }

    /// Resolve the secret.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] when the referenced environment
    /// variable is missing or blank, or a literal is blank.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Literal { value } => {
                if value.trim().is_empty() {
                    return Err(ResolveError::Config("literal secret is empty".into()));
                }
                Ok(Some(value.clone()))
            }
            Self::Env { var } => {
                let value = std::env::var(var).map_err(|_| {
                    ResolveError::Config(format!("secret env var is missing: {var}"))
                })?;
                if value.trim().is_empty() {
                    return Err(ResolveError::Config(format!(
                        "secret env var is empty: {var}"
                    )));
                }
                Ok(Some(value))
            }
        }
    }
}

/// Search engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Engines queried for every issued query, in merge order.
    pub engines: Vec<SearchEngine>,
    /// Hits requested from each engine per query.
    pub results_per_query: usize,
    /// Minimum interval between two calls to the same engine.
    pub min_interval_ms: u64,
    /// HTTP timeout for engine calls and page fetches.
    pub timeout_seconds: u64,
    /// Ask engines to filter adult content.
    pub safe_search: bool,
    /// User-Agent override. Unset rotates browser strings.
    pub user_agent: Option<String>,
    /// SerpAPI endpoint root.
    pub serpapi_base_url: String,
    /// DuckDuckGo HTML endpoint.
    pub duckduckgo_url: String,
    /// SerpAPI key.
    pub serpapi_api_key: SecretRef,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let engine_defaults = SearchConfig::default();
        Self {
            engines: SearchEngine::all().to_vec(),
            results_per_query: 5,
            min_interval_ms: 1_500,
            timeout_seconds: engine_defaults.timeout_seconds,
            safe_search: engine_defaults.safe_search,
            user_agent: None,
            serpapi_base_url: engine_defaults.serpapi_base_url,
            duckduckgo_url: engine_defaults.duckduckgo_url,
            serpapi_api_key: SecretRef::env("SERPAPI_API_KEY"),
        }
    }
}

impl SearchSettings {
    /// Per-call engine configuration with an already resolved SerpAPI key.
    pub fn to_search_config(&self, serpapi_api_key: Option<String>) -> SearchConfig {
        SearchConfig {
            max_results: self.results_per_query,
            timeout_seconds: self.timeout_seconds,
            safe_search: self.safe_search,
            user_agent: self.user_agent.clone(),
            serpapi_api_key,
            serpapi_base_url: self.serpapi_base_url.clone(),
            duckduckgo_url: self.duckduckgo_url.clone(),
        }
    }
}

/// Candidate extraction limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Merged hits considered per pass.
    pub max_hits: usize,
    /// Hits whose page is actually fetched; the rest use title and snippet.
    pub max_scraped_pages: usize,
    /// Characters of page text kept per fetched page.
    pub page_max_chars: usize,
    /// Characters of combined text sent to the model for name extraction.
    pub llm_text_max_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_hits: 15,
            max_scraped_pages: 10,
            page_max_chars: 5_000,
            llm_text_max_chars: 3_000,
        }
    }
}

/// Confidence composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Candidates (by provisional order) sent for designation confirmation.
    pub confirm_top_n: usize,
    /// Characters of supporting context sent with a confirmation request.
    pub confirm_context_max_chars: usize,
    /// Weight of source credibility.
    pub credibility_weight: f64,
    /// Weight of the cross-engine flag.
    pub cross_engine_weight: f64,
    /// Weight of the designation-match score.
    pub designation_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confirm_top_n: 5,
            confirm_context_max_chars: 1_500,
            credibility_weight: 0.5,
            cross_engine_weight: 0.3,
            designation_weight: 0.2,
        }
    }
}

/// Retry policy and cost ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Planned queries actually issued per pass.
    pub queries_per_run: usize,
    /// Best confidence below this triggers a broadened retry.
    pub confidence_threshold: f64,
    /// Maximum number of broadened retries.
    pub max_retries: u32,
    /// Wall-clock ceiling for a whole resolution, retry included.
    pub run_timeout_seconds: u64,
    /// Maximum language model calls per resolution, retry included.
    pub llm_call_budget: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queries_per_run: 4,
            confidence_threshold: 0.5,
            max_retries: 1,
            run_timeout_seconds: 120,
            llm_call_budget: 60,
        }
    }
}

/// OpenAI-compatible chat-completions client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// When false the pipeline runs on the pattern extractor alone and every
    /// confirmation is neutral.
    pub enabled: bool,
    /// API root; `/v1/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout_seconds: u64,
    /// API key.
    pub api_key: SecretRef,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.groq.com/openai".to_owned(),
            model: "llama-3.1-8b-instant".to_owned(),
            temperature: 0.2,
            max_tokens: 256,
            timeout_seconds: 30,
            api_key: SecretRef::env("GROQ_API_KEY"),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for a log file. Unset logs to stderr only.
    pub directory: Option<PathBuf>,
    /// Log file name inside `directory`.
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "rolecall=info,rolecall_search=info".to_owned(),
            directory: None,
            file_name: "rolecall.log".to_owned(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ResolveError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ResolveError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/rolecall/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("rolecall").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("rolecall")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/rolecall-config/config.toml")
        }
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.engines.is_empty() {
            return config_err("search.engines must list at least one engine");
        }
        if search.results_per_query == 0 {
            return config_err("search.results_per_query must be greater than 0");
        }
        if search.timeout_seconds == 0 {
            return config_err("search.timeout_seconds must be greater than 0");
        }
        if self.extraction.max_hits == 0 {
            return config_err("extraction.max_hits must be greater than 0");
        }
        if self.extraction.max_scraped_pages > self.extraction.max_hits {
            return config_err("extraction.max_scraped_pages cannot exceed extraction.max_hits");
        }
        if self.extraction.page_max_chars == 0 || self.extraction.llm_text_max_chars == 0 {
            return config_err("extraction character limits must be greater than 0");
        }

        let scoring = &self.scoring;
        for (name, weight) in [
            ("credibility_weight", scoring.credibility_weight),
            ("cross_engine_weight", scoring.cross_engine_weight),
            ("designation_weight", scoring.designation_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return config_err(&format!("scoring.{name} must be within [0, 1]"));
            }
        }
        let weight_sum =
            scoring.credibility_weight + scoring.cross_engine_weight + scoring.designation_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return config_err(&format!("scoring weights must sum to 1.0, got {weight_sum}"));
        }

        let pipeline = &self.pipeline;
        if pipeline.queries_per_run == 0 {
            return config_err("pipeline.queries_per_run must be greater than 0");
        }
        if !(0.0..=1.0).contains(&pipeline.confidence_threshold) {
            return config_err("pipeline.confidence_threshold must be within [0, 1]");
        }
        if pipeline.run_timeout_seconds == 0 {
            return config_err("pipeline.run_timeout_seconds must be greater than 0");
        }

        if self.llm.enabled {
            if self.llm.base_url.trim().is_empty() {
                return config_err("llm.base_url is empty");
            }
            if self.llm.model.trim().is_empty() {
                return config_err("llm.model is empty");
            }
            if self.llm.timeout_seconds == 0 {
                return config_err("llm.timeout_seconds must be greater than 0");
            }
        }
        Ok(())
    }
}

fn config_err(message: &str) -> Result<()> {
    Err(ResolveError::Config(message.to_owned()))
}
