//! Error types for the chat-completions client.
//!
//! Each variant carries a stable code that prefixes the Display output and
//! is available through [`LlmError::code()`].

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid or missing API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Request to the provider failed or was rate limited.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// Request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Provider returned an error status or an unusable body.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
}

/// Errors produced by the chat-completions client.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// Authentication failed.
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    Auth(String),

    /// Transport failure or rate limit.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    Request(String),

    /// Request timed out.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    Timeout(String),

    /// Error status or malformed response body.
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    Provider(String),
}

impl LlmError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::Auth(_) => error_codes::AUTH_FAILED,
            Self::Request(_) => error_codes::REQUEST_FAILED,
            Self::Timeout(_) => error_codes::TIMEOUT_ERROR,
            Self::Provider(_) => error_codes::PROVIDER_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::Auth(m)
            | Self::Request(m)
            | Self::Timeout(m)
            | Self::Provider(m) => m,
        }
    }
}
