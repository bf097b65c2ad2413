//! CLI binary for rolecall.

use clap::Parser;
use rolecall::{Resolver, ResolverConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Find who holds a designation at a company.
#[derive(Parser)]
#[command(name = "rolecall", version, about)]
struct Cli {
    /// Company name, e.g. "Acme Corp".
    company: String,

    /// Designation, e.g. "CTO" or "Head of Sales".
    designation: String,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ResolverConfig::from_file(path)?,
        None => {
            let path = ResolverConfig::default_config_path();
            if path.exists() {
                ResolverConfig::from_file(&path)?
            } else {
                ResolverConfig::default()
            }
        }
    };

    // Held until exit so the file writer flushes.
    let _log_guard = rolecall::logging::init(&config.logging)?;

    let resolver = Resolver::from_config(config)?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            ctrl_c_cancel.cancel();
        }
    });

    let result = resolver
        .resolve_cancellable(&cli.company, &cli.designation, cancel)
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if result.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
