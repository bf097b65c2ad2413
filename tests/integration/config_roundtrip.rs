//! Config file round-trips and resolver construction from TOML.

use rolecall::config::{ResolverConfig, SecretRef};
use rolecall::{ResolveError, Resolver};
use rolecall_search::SearchEngine;

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested").join("config.toml");

    let mut config = ResolverConfig::default();
    config.pipeline.confidence_threshold = 0.7;
    config.pipeline.llm_call_budget = 12;
    config.search.engines = vec![SearchEngine::DuckDuckGo];
    config.llm.api_key = SecretRef::Literal {
        value: "gsk_test".into(),
    };
    config.save_to_file(&path).unwrap();

    let loaded = ResolverConfig::from_file(&path).unwrap();
    assert_eq!(loaded.pipeline.confidence_threshold, 0.7);
    assert_eq!(loaded.pipeline.llm_call_budget, 12);
    assert_eq!(loaded.search.engines, vec![SearchEngine::DuckDuckGo]);
    assert_eq!(loaded.llm.api_key, config.llm.api_key);
    assert_eq!(loaded.scoring.confirm_top_n, 5);
}

#[test]
fn hand_written_toml_builds_a_resolver() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[search]
engines = ["duckduckgo"]
min_interval_ms = 0

[search.serpapi_api_key]
type = "none"

[pipeline]
queries_per_run = 2
run_timeout_seconds = 30

[llm]
enabled = false
"#,
    )
    .unwrap();

    let config = ResolverConfig::from_file(&path).unwrap();
    assert_eq!(config.search.serpapi_api_key, SecretRef::None);
    assert_eq!(config.extraction.max_hits, 15);

    let resolver = Resolver::from_config(config).unwrap();
    assert_eq!(resolver.config().pipeline.queries_per_run, 2);
    assert!(!resolver.config().llm.enabled);
}

#[test]
fn invalid_weights_are_rejected_at_construction() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[scoring]\ncredibility_weight = 0.9\n\n[llm]\nenabled = false\n",
    )
    .unwrap();

    let config = ResolverConfig::from_file(&path).unwrap();
    assert!(matches!(
        Resolver::from_config(config),
        Err(ResolveError::Config(_))
    ));
}

#[test]
fn malformed_toml_is_a_config_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pipeline\nqueries_per_run = ").unwrap();
    assert!(matches!(
        ResolverConfig::from_file(&path),
        Err(ResolveError::Config(_))
    ));
}
