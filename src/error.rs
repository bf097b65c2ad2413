//! Error types for the rolecall pipeline.
//!
//! Collaborator failures never surface through these types: they are
//! absorbed where the call is made. [`ResolveError`] covers what is left,
//! namely bad input, bad configuration and a run that could not finish.

use crate::llm::LlmError;
use rolecall_search::SearchError;

/// Top-level error type for a resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Missing or blank company / designation.
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search engine or page fetch error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Language model client error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The run exceeded its wall-clock deadline.
    #[error("run timed out after {0}s")]
    Timeout(u64),

    /// The caller cancelled the run.
    #[error("run cancelled")]
    Cancelled,

    /// Unexpected internal failure (including a panicked run task).
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ResolveError>;
