//! Tracing subscriber setup.
//!
//! Logs go to stderr (stdout is reserved for the JSON result) and optionally
//! to a file through a non-blocking appender.

use crate::config::LoggingConfig;
use crate::error::{ResolveError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when both `RUST_LOG` and the configured level are unusable.
const FALLBACK_FILTER: &str = "info";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level`. The returned guard must be held for
/// as long as the file writer should keep flushing; it is `None` when no log
/// directory is configured.
///
/// # Errors
///
/// Returns [`ResolveError::Io`] if the log directory cannot be created and
/// [`ResolveError::Config`] if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(&config.level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match config.directory {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, &config.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ResolveError::Config(format!("failed to install tracing subscriber: {e}")))?;

    Ok(guard)
}

/// Parse a filter directive, falling back to `info` when it is malformed.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}
