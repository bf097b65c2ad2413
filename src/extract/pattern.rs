//! Capitalised-name pattern extractor.
//!
//! Finds two-word proper names (with an optional middle initial and an
//! optional hyphenated surname) and drops common page-furniture phrases
//! that look like names.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\b([A-Z][a-z]{1,20}(?:\s[A-Z]\.?)?\s[A-Z][a-z]{1,20}(?:-[A-Z][a-z]{1,20})?)\b")
        .expect("name pattern is valid")
});

/// Capitalised phrases that are never person names.
const FALSE_POSITIVES: &[&str] = &[
    "The Company",
    "Our Team",
    "Read More",
    "Learn More",
    "Sign In",
    "Sign Up",
    "Contact Us",
    "Privacy Policy",
    "Terms Service",
    "All Rights",
    "New York",
    "San Francisco",
    "Los Angeles",
    "United States",
    "United Kingdom",
    "Hong Kong",
    "Last Updated",
    "About Us",
    "See Also",
    "Click Here",
    "Find Out",
];

/// Minimum length of an accepted match, exclusive.
const MIN_NAME_LEN: usize = 3;

/// Name-shaped phrases in `text`, in first-occurrence order, deduplicated.
pub fn extract_pattern_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    NAME_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| name.len() > MIN_NAME_LEN && !FALSE_POSITIVES.contains(name))
        .filter(|name| seen.insert(*name))
        .map(str::to_owned)
        .collect()
}
