//! CLI for forge-discovery.
//!
//! Loads a discovery configuration, builds one client per configured forge,
//! runs a single discovery pass and writes the result as JSON.

use clap::Parser;
use forge_discovery::{
    create_client, ConfigError, DiscoveryConfig, DiscoveryError, DiscoveryResult,
    DiscoveryService, DocProbe, ForgeManager, RunSummary,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Forge Discovery - Find documentation repositories across code forges.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the discovery configuration file.
    #[arg(long, env = "FORGE_DISCOVERY_CONFIG", default_value = "discovery.toml")]
    config: PathBuf,

    /// Write the discovery result to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the included repositories in site-build form to this file.
    #[arg(long)]
    build_output: Option<PathBuf>,

    /// Abort discovery after this many seconds.
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,

    /// Maximum forges processed simultaneously (overrides the config file).
    #[arg(long)]
    forge_concurrency: Option<usize>,

    /// Maximum documentation probes in flight per forge (overrides the config file).
    #[arg(long)]
    probe_concurrency: Option<usize>,
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to serialize discovery result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a run produced, beyond the result itself.
struct Outcome {
    summary: RunSummary,
    /// Forges whose client could not be created.
    skipped_forges: usize,
    /// Whether the deadline or Ctrl-C cut the run short.
    cancelled: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // octocrab talks TLS through rustls; pick the provider before any client exists.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();

    match run(args).await {
        Ok(outcome) => {
            print_summary(&outcome);

            if outcome.summary.has_failures() || outcome.skipped_forges > 0 || outcome.cancelled {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with compact output and `RUST_LOG` filtering (default "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<Outcome, CliError> {
    let mut config = DiscoveryConfig::load(&args.config)?;
    if let Some(limit) = args.forge_concurrency {
        config.discovery.forge_concurrency = limit;
    }
    if let Some(limit) = args.probe_concurrency {
        config.discovery.probe_concurrency = limit;
    }
    config.validate(&args.config)?;

    let probe = DocProbe::from_filtering(&config.filtering);
    let mut manager = ForgeManager::new();
    let mut skipped_forges = 0;
    for forge in &config.forges {
        match create_client(forge, &probe) {
            Ok(client) => manager.add_forge(forge.clone(), client),
            Err(e) => {
                warn!(forge = %forge.name, error = %e, "Skipping forge, client could not be created");
                skipped_forges += 1;
            }
        }
    }

    let service = DiscoveryService::new(manager, config.filtering.clone()).with_limits(config.discovery);

    let cancel = CancellationToken::new();
    let watchdog = spawn_watchdog(cancel.clone(), Duration::from_secs(args.timeout_secs));
    let result = service.discover_all(&cancel).await;
    watchdog.abort();
    let result = result?;
    let cancelled = cancel.is_cancelled();

    write_result(&result, args.output.as_deref()).await?;
    if let Some(path) = &args.build_output {
        let builds = result.build_repositories(service.filtering());
        let json = serde_json::to_string_pretty(&builds)?;
        write_file(path, json).await?;
        info!(path = %path.display(), repositories = builds.len(), "Wrote site-build repositories");
    }

    Ok(Outcome {
        summary: RunSummary::from_result(&result),
        skipped_forges,
        cancelled,
    })
}

/// Cancels `cancel` when the deadline passes or Ctrl-C is pressed.
fn spawn_watchdog(cancel: CancellationToken, deadline: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => {
                warn!(timeout_secs = deadline.as_secs(), "Discovery deadline reached, cancelling");
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                    return;
                }
                warn!("Interrupted, cancelling discovery");
            }
        }
        cancel.cancel();
    })
}

async fn write_result(result: &DiscoveryResult, output: Option<&Path>) -> Result<(), CliError> {
    let json = result.to_json_pretty()?;
    match output {
        Some(path) => {
            write_file(path, json).await?;
            info!(path = %path.display(), "Wrote discovery result");
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn write_file(path: &Path, contents: String) -> Result<(), CliError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Prints the final run summary to stderr, keeping stdout for JSON.
fn print_summary(outcome: &Outcome) {
    eprintln!("\nSummary:");
    eprint!("{}", outcome.summary);
    if outcome.skipped_forges > 0 {
        eprintln!("Skipped forges: {}", outcome.skipped_forges);
    }
    if outcome.cancelled {
        eprintln!("Run was cancelled before completion");
    }
}
