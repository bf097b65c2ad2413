//! Query planning: designation aliases and search-query templates.

use std::collections::HashSet;

/// Common abbreviated designations and their canonical forms.
const DESIGNATION_ALIASES: &[(&str, &[&str])] = &[
    ("ceo", &["Chief Executive Officer", "CEO"]),
    ("cfo", &["Chief Financial Officer", "CFO"]),
    ("cto", &["Chief Technology Officer", "CTO"]),
    ("coo", &["Chief Operating Officer", "COO"]),
    ("cmo", &["Chief Marketing Officer", "CMO"]),
    ("cio", &["Chief Information Officer", "CIO"]),
    ("ciso", &["Chief Information Security Officer", "CISO"]),
    ("cpo", &["Chief Product Officer", "CPO"]),
    ("cro", &["Chief Revenue Officer", "CRO"]),
    ("vp", &["Vice President", "VP"]),
    ("svp", &["Senior Vice President", "SVP"]),
    ("evp", &["Executive Vice President", "EVP"]),
    ("md", &["Managing Director", "MD"]),
    ("gm", &["General Manager", "GM"]),
    ("president", &["President"]),
    ("founder", &["Founder", "Co-Founder"]),
    ("director", &["Director"]),
    ("head", &["Head"]),
    ("chairman", &["Chairman", "Chairperson"]),
];

/// Builds the ordered, deduplicated query list for a pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    /// Alias variants for `designation`.
    ///
    /// Lookup is case-insensitive. The designation as given comes first
    /// unless the alias list already contains it verbatim; an unknown
    /// designation yields just itself.
    pub fn expand_designation(designation: &str) -> Vec<String> {
        let key = designation.trim().to_lowercase();
        let aliases: &[&str] = DESIGNATION_ALIASES
            .iter()
            .find(|(abbr, _)| *abbr == key)
            .map(|(_, aliases)| *aliases)
            .unwrap_or_default();

        let mut variants: Vec<String> = aliases.iter().map(|a| (*a).to_owned()).collect();
        if !aliases.contains(&designation) {
            variants.insert(0, designation.to_owned());
        }
        variants
    }

    /// First-pass queries: three templates per alias variant.
    ///
    /// Never empty when both inputs are non-empty.
    pub fn plan(&self, company: &str, designation: &str) -> Vec<String> {
        let queries = Self::expand_designation(designation)
            .iter()
            .flat_map(|variant| {
                [
                    format!("{company} {variant}"),
                    format!("Who is the {variant} of {company}"),
                    format!("{company} {variant} LinkedIn"),
                ]
            })
            .collect();
        dedup_case_insensitive(queries)
    }

    /// Retry queries: leadership-page style plus a LinkedIn-restricted query.
    pub fn broadened(&self, company: &str, designation: &str) -> Vec<String> {
        dedup_case_insensitive(vec![
            format!("{company} leadership team {designation}"),
            format!("{designation} {company} site:linkedin.com"),
            format!("{company} executive team"),
            format!("current {designation} at {company}"),
        ])
    }
}

/// Drop case-insensitive duplicates, keeping first-seen order.
fn dedup_case_insensitive(queries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .filter(|q| seen.insert(q.to_lowercase()))
        .collect()
}
