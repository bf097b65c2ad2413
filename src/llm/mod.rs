//! Language model oracle used for name extraction and designation
//! confirmation.
//!
//! The pipeline only sees [`NameOracle`]. Its methods never fail: transport
//! errors, malformed replies and an exhausted call budget all degrade to an
//! empty name list or the neutral confidence [`NEUTRAL_CONFIDENCE`].

pub mod client;
pub mod error;
pub mod oracle;

pub use client::{ChatClient, ChatMessage, Role};
pub use error::LlmError;
pub use oracle::ChatOracle;

use async_trait::async_trait;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

/// Confidence returned when the model cannot be asked or its reply has no number.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Extraction and confirmation capability.
#[async_trait]
pub trait NameOracle: Send + Sync {
    /// Full names of people holding `designation` at `company` according to
    /// `text`. Empty text yields an empty list without a model call.
    async fn extract_names(&self, text: &str, company: &str, designation: &str) -> Vec<String>;

    /// Confidence in `[0, 1]` that `name` holds `designation` at `company`.
    async fn confirm_designation(
        &self,
        name: &str,
        company: &str,
        designation: &str,
        context: &str,
    ) -> f64;
}

/// Oracle used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

#[async_trait]
impl NameOracle for DisabledOracle {
    async fn extract_names(&self, _text: &str, _company: &str, _designation: &str) -> Vec<String> {
        Vec::new()
    }

    async fn confirm_designation(
        &self,
        _name: &str,
        _company: &str,
        _designation: &str,
        _context: &str,
    ) -> f64 {
        NEUTRAL_CONFIDENCE
    }
}

/// Caps the number of model calls one run may make.
///
/// Once the budget is spent, extraction yields nothing and confirmation is
/// neutral. Empty extraction inputs do not consume budget.
pub struct BudgetedOracle {
    inner: Arc<dyn NameOracle>,
    remaining: AtomicUsize,
}

impl BudgetedOracle {
    pub fn new(inner: Arc<dyn NameOracle>, budget: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(budget),
        }
    }

    /// Calls still allowed.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        let taken = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if !taken {
            tracing::debug!("LLM call budget exhausted");
        }
        taken
    }
}

#[async_trait]
impl NameOracle for BudgetedOracle {
    async fn extract_names(&self, text: &str, company: &str, designation: &str) -> Vec<String> {
        if text.trim().is_empty() || !self.take() {
            return Vec::new();
        }
        self.inner.extract_names(text, company, designation).await
    }

    async fn confirm_designation(
        &self,
        name: &str,
        company: &str,
        designation: &str,
        context: &str,
    ) -> f64 {
        if !self.take() {
            return NEUTRAL_CONFIDENCE;
        }
        self.inner
            .confirm_designation(name, company, designation, context)
            .await
    }
}

/// Split a model reply into names: one per line, list markers stripped,
/// `NONE` and blank lines ignored.
pub fn parse_name_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c == '-' || c == '*' || c == '•' || c == '.' || c == ')' || c.is_ascii_digit()
                })
                .trim()
        })
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("none"))
        .map(str::to_owned)
        .collect()
}

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(\d+\.?\d*)").expect("number pattern is valid")
});

/// First numeric token of a reply, capped at 1.0.
pub fn parse_confidence(reply: &str) -> Option<f64> {
    NUMBER_RE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|value| value.min(1.0))
}
