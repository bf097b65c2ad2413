//! End-to-end resolutions over mock collaborators.

use crate::helpers::{
    RecordingProvider, ScriptedOracle, StaticFetcher, hit, resolver, test_config,
};
use rolecall::planner::QueryPlanner;
use rolecall::{ProviderRateLimiter, Resolution};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn is_broadened(query: &str) -> bool {
    QueryPlanner.broadened("Acme", "CEO").iter().any(|q| q == query)
}

#[tokio::test]
async fn blank_input_contacts_no_collaborator() {
    let serp = Arc::new(RecordingProvider::fixed(
        "serpapi",
        vec![hit("t", "https://acme.com", "Jane Doe")],
    ));
    let fetcher = Arc::new(StaticFetcher::default());
    let oracle = Arc::new(ScriptedOracle::new(1.0));
    let resolver = resolver(test_config(), &[serp.clone()], fetcher.clone(), oracle.clone());

    for (company, designation) in [("", "CEO"), ("Acme", "   "), ("\t", "\n")] {
        let result = resolver.resolve(company, designation).await;
        assert_eq!(
            result,
            Resolution::error("Company and designation are required")
        );
        assert_eq!(result.confidence_score(), 0.0);
    }

    assert_eq!(serp.calls(), 0);
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(oracle.total_calls(), 0);
}

#[tokio::test]
async fn cross_validated_linkedin_hit_wins_in_one_pass() {
    let serp = Arc::new(RecordingProvider::fixed(
        "serpapi",
        vec![hit(
            "Jane Doe | LinkedIn",
            "https://www.linkedin.com/in/janedoe",
            "Jane Doe is the CEO of Acme.",
        )],
    ));
    let ddg = Arc::new(RecordingProvider::fixed(
        "duckduckgo",
        vec![hit(
            "Acme leadership",
            "https://acme.com/about",
            "Our CEO Jane Doe leads the company.",
        )],
    ));
    let fetcher = Arc::new(StaticFetcher::default());
    let oracle = Arc::new(ScriptedOracle::new(0.0).confirms("Jane Doe", 1.0));
    let resolver = resolver(
        test_config(),
        &[serp.clone(), ddg.clone()],
        fetcher.clone(),
        oracle.clone(),
    );

    let result = resolver.resolve("  Acme ", " CEO ").await;

    assert_eq!(
        result,
        Resolution::Found {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            current_title: "CEO".into(),
            company: "Acme".into(),
            source_url: "https://www.linkedin.com/in/janedoe".into(),
            confidence_score: 0.925,
        }
    );
    // One pass: four planned queries per provider.
    assert_eq!(serp.calls(), 4);
    assert_eq!(ddg.calls(), 4);
    assert_eq!(serp.queries()[0], "Acme Chief Executive Officer");
    // Two distinct links after dedup, both scraped.
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(oracle.confirm_calls(), 1);
}

#[tokio::test]
async fn scraped_page_text_contributes_names() {
    let serp = Arc::new(RecordingProvider::fixed(
        "serpapi",
        vec![hit("Board", "https://investor.acme.com/board", "directors")],
    ));
    let fetcher = Arc::new(
        StaticFetcher::default()
            .with_page("https://investor.acme.com/board", "Our president is Mary Major."),
    );
    let oracle = Arc::new(ScriptedOracle::new(0.5));
    let resolver = resolver(test_config(), &[serp], fetcher, oracle);

    let result = resolver.resolve("Acme", "President").await;

    // 0.9 * 0.5 + 0.5 * 0.2
    assert_eq!(result.confidence_score(), 0.55);
    assert!(matches!(result, Resolution::Found { ref last_name, .. } if last_name == "Major"));
}

#[tokio::test]
async fn no_candidates_returns_no_result_after_retry() {
    let serp = Arc::new(RecordingProvider::empty("serpapi"));
    let ddg = Arc::new(RecordingProvider::fixed(
        "duckduckgo",
        vec![hit("Read More", "https://acme.com", "Privacy Policy")],
    ));
    let oracle = Arc::new(ScriptedOracle::new(1.0));
    let resolver = resolver(
        test_config(),
        &[serp.clone(), ddg.clone()],
        Arc::new(StaticFetcher::default()),
        oracle.clone(),
    );

    let result = resolver.resolve("Acme", "CEO").await;

    assert_eq!(result, Resolution::no_result());
    assert_eq!(result.error_message(), Some("No verified results found"));
    assert_eq!(serp.calls(), 8);
    assert_eq!(ddg.calls(), 8);
    assert_eq!(oracle.confirm_calls(), 0);
}

#[tokio::test]
async fn low_confidence_retries_once_and_keeps_the_better_pass() {
    let serp = Arc::new(RecordingProvider::new("serpapi", |query| {
        if is_broadened(query) {
            vec![hit("Acme profile", "https://en.wikipedia.org/wiki/Acme", "John Roe runs Acme")]
        } else {
            vec![hit("Acme profile", "https://acme.com/team", "Jane Doe works here")]
        }
    }));
    let oracle = Arc::new(ScriptedOracle::new(0.0));
    let resolver = resolver(
        test_config(),
        &[serp.clone()],
        Arc::new(StaticFetcher::default()),
        oracle,
    );

    let result = resolver.resolve("Acme", "CEO").await;

    // Pass one: 0.6 * 0.5 = 0.3. Pass two: 0.8 * 0.5 = 0.4.
    assert_eq!(result.confidence_score(), 0.4);
    assert!(matches!(result, Resolution::Found { ref first_name, .. } if first_name == "John"));

    let queries = serp.queries();
    assert_eq!(queries.len(), 8);
    assert!(queries[..4].iter().all(|q| !is_broadened(q)));
    assert_eq!(queries[4..], QueryPlanner.broadened("Acme", "CEO")[..]);
}

#[tokio::test]
async fn equal_low_passes_return_the_first_and_stop() {
    let serp = Arc::new(RecordingProvider::new("serpapi", |query| {
        if is_broadened(query) {
            vec![hit("Acme profile", "https://acme.com/other", "John Roe runs Acme")]
        } else {
            vec![hit("Acme profile", "https://acme.com/team", "Jane Doe runs Acme")]
        }
    }));
    let resolver = resolver(
        test_config(),
        &[serp.clone()],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.0)),
    );

    let result = resolver.resolve("Acme", "CEO").await;

    assert_eq!(result.confidence_score(), 0.3);
    assert!(matches!(result, Resolution::Found { ref first_name, .. } if first_name == "Jane"));
    // Exactly two passes, never a third.
    assert_eq!(serp.calls(), 8);
}

#[tokio::test]
async fn llm_call_budget_is_respected() {
    let hits = (0..15)
        .map(|i| hit("team", &format!("https://acme.com/p{i}"), "Jane Doe and John Roe"))
        .collect();
    let serp = Arc::new(RecordingProvider::fixed("serpapi", hits));
    let oracle = Arc::new(ScriptedOracle::new(0.0).knows("Jane Doe"));
    let mut config = test_config();
    config.pipeline.llm_call_budget = 3;
    config.search.results_per_query = 15;
    let resolver = resolver(
        config,
        &[serp],
        Arc::new(StaticFetcher::default()),
        oracle.clone(),
    );

    let result = resolver.resolve("Acme", "CEO").await;

    assert!(!result.is_error());
    assert_eq!(oracle.total_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn slow_run_times_out() {
    let serp = Arc::new(RecordingProvider::empty("serpapi").with_delay(Duration::from_secs(600)));
    let mut config = test_config();
    config.pipeline.run_timeout_seconds = 5;
    let resolver = resolver(
        config,
        &[serp],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.5)),
    );

    let result = resolver.resolve("Acme", "CEO").await;

    assert_eq!(
        result,
        Resolution::error("Pipeline error: run timed out after 5s")
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_during_retry_keeps_first_pass_result() {
    // 0.6 * 0.5 = 0.3, below the threshold, so a broadened pass follows.
    let serp = Arc::new(RecordingProvider::fixed(
        "serpapi",
        vec![hit("Acme profile", "https://acme.com/team", "Jane Doe leads the company.")],
    ));
    let ddg = Arc::new(
        RecordingProvider::empty("duckduckgo").slow_after(4, Duration::from_secs(600)),
    );
    let mut config = test_config();
    config.pipeline.run_timeout_seconds = 5;
    let resolver = resolver(
        config,
        &[serp, ddg.clone()],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.0)),
    );

    let result = resolver.resolve("Acme", "CEO").await;

    assert_eq!(
        result,
        Resolution::Found {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            current_title: "CEO".into(),
            company: "Acme".into(),
            source_url: "https://acme.com/team".into(),
            confidence_score: 0.3,
        }
    );
    // The retry started before the deadline cut it short.
    assert_eq!(ddg.calls(), 5);
    assert!(is_broadened(&ddg.queries()[4]));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_run() {
    let serp = Arc::new(RecordingProvider::empty("serpapi").with_delay(Duration::from_secs(60)));
    let resolver = resolver(
        test_config(),
        &[serp],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.5)),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let result = resolver.resolve_cancellable("Acme", "CEO", cancel).await;

    assert_eq!(result, Resolution::error("Pipeline error: run cancelled"));
}

#[tokio::test]
async fn panicking_provider_becomes_pipeline_error() {
    let serp = Arc::new(RecordingProvider::empty("serpapi").panicking());
    let resolver = resolver(
        test_config(),
        &[serp],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.5)),
    );

    let result = resolver.resolve("Acme", "CEO").await;

    assert!(result.is_error());
    assert_eq!(result.confidence_score(), 0.0);
    let message = result.error_message().unwrap();
    assert!(message.starts_with("Pipeline error: "), "{message}");
    assert!(message.contains("serpapi provider exploded"), "{message}");
}

#[tokio::test(start_paused = true)]
async fn concurrent_resolutions_share_the_rate_limiter() {
    let limiter = Arc::new(ProviderRateLimiter::new(Duration::from_secs(1)));
    let serp_a = Arc::new(RecordingProvider::fixed(
        "serpapi",
        vec![hit("t", "https://investor.acme.com", "Jane Doe")],
    ));
    let serp_b = Arc::new(RecordingProvider::fixed(
        "serpapi",
        vec![hit("t", "https://investor.globex.com", "Hank Scorpio")],
    ));
    let a = resolver(
        test_config(),
        &[serp_a],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.5)),
    )
    .with_rate_limiter(Arc::clone(&limiter));
    let b = resolver(
        test_config(),
        &[serp_b],
        Arc::new(StaticFetcher::default()),
        Arc::new(ScriptedOracle::new(0.5)),
    )
    .with_rate_limiter(Arc::clone(&limiter));

    let start = tokio::time::Instant::now();
    let (ra, rb) = tokio::join!(a.resolve("Acme", "CEO"), b.resolve("Globex", "CEO"));

    assert!(!ra.is_error());
    assert!(!rb.is_error());
    // Eight calls to one provider name, one second apart.
    assert!(start.elapsed() >= Duration::from_secs(7));
}
