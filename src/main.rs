//! Pen-Finder main entry point
//!
//! This is the command-line interface for the Pen-Finder run server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pen_finder::config::{load_config, validate, Config};
use pen_finder::crawler::HttpFetcher;
use pen_finder::recorder::MatchCounter;
use pen_finder::scraper::{ParallelRunner, ScrapeOptions, ScraperRegistry};
use pen_finder::server::{self, AppState, RunLauncher, RunStatusCache};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Pen-Finder: on-demand product discovery for fountain pen resellers
///
/// Pen-Finder serves a small HTTP API. Each `POST /run/` crawls the selected
/// reseller sites in the background and records every product page found;
/// `GET /run/{id}` reports whether the run is still in progress.
#[derive(Parser, Debug)]
#[command(name = "pen-finder")]
#[command(version)]
#[command(about = "On-demand product discovery for fountain pen resellers", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the run server
    Start(StartArgs),
}

#[derive(clap::Args, Debug)]
struct StartArgs {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(long)]
    bind_addr: Option<String>,

    /// Deadline for each run in seconds (overrides the config file)
    #[arg(long)]
    run_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Start(args) => handle_start(args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pen_finder=info,warn"),
            1 => EnvFilter::new("pen_finder=debug,info"),
            2 => EnvFilter::new("pen_finder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, then applies command-line overrides
fn resolve_config(args: &StartArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(bind_addr) = &args.bind_addr {
        config.server.bind_addr = bind_addr.clone();
    }
    if let Some(timeout) = args.run_timeout_secs {
        config.server.run_timeout_secs = Some(timeout);
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Runs the server until SIGINT or SIGTERM
async fn handle_start(args: StartArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind_addr))?;

    let fetcher = Arc::new(HttpFetcher::new(&config.crawler).context("building HTTP client")?);
    let overrides = config
        .targets
        .iter()
        .map(|t| (t.kind, t.target.clone()))
        .collect();
    let registry = ScraperRegistry::with_overrides(
        overrides,
        fetcher,
        config.crawler.max_concurrent_requests,
    )?;

    tracing::info!(
        "Scrapers: {}",
        registry
            .kinds()
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    match config.server.run_timeout() {
        Some(timeout) => tracing::info!("Run deadline: {:?}", timeout),
        None => tracing::info!("Runs have no deadline"),
    }

    let shutdown = CancellationToken::new();
    let metrics = Arc::new(MatchCounter::new());
    let launcher = RunLauncher::new(
        Arc::new(RunStatusCache::new()),
        Arc::new(registry),
        Arc::new(ParallelRunner::new()),
        ScrapeOptions::new(metrics.clone()),
    )
    .with_run_timeout(config.server.run_timeout())
    .with_shutdown(shutdown.clone());

    tokio::spawn(wait_for_signal(shutdown.clone()));

    let state = Arc::new(AppState::new(launcher, metrics));
    server::serve(addr, state, shutdown).await?;

    Ok(())
}

/// Cancels `shutdown` on the first SIGINT or SIGTERM
async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Received shutdown signal");
    shutdown.cancel();
}
