//! GTM-Probe main entry point
//!
//! This is the command-line interface for the GTM-Probe service.

use anyhow::Context;
use clap::Parser;
use gtm_probe::config::{apply_port_override, load_config_with_hash, Config, PORT_ENV};
use gtm_probe::gateway::{self, AppState};
use gtm_probe::pipeline::{spawn_retention_sweeper, Clock, HttpFetcher, Scheduler, SystemClock};
use gtm_probe::storage::{JobStore, MemoryJobStore};
use gtm_probe::Analyzer;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// GTM-Probe: Google Tag Manager detection service
///
/// Serves an HTTP API that fetches pages, detects embedded GTM containers,
/// and reports whether they are loaded through the site's own domain.
#[derive(Parser, Debug)]
#[command(name = "gtm-probe")]
#[command(version)]
#[command(
    about = "Detects first-party (proxified) Google Tag Manager containers",
    long_about = None
)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration, print it and exit
    #[arg(long, conflicts_with = "analyze")]
    check_config: bool,

    /// Analyze a single URL, print the result as JSON and exit
    #[arg(long, value_name = "URL")]
    analyze: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.check_config {
        handle_check_config(&config);
    } else if let Some(url) = cli.analyze.as_deref() {
        handle_analyze(&config, url).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gtm_probe=info,warn"),
            1 => EnvFilter::new("gtm_probe=debug,info"),
            2 => EnvFilter::new("gtm_probe=trace,debug"),
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

/// Loads the configuration file (if any) and applies the `PORT` override
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let port = std::env::var(PORT_ENV).ok();
    apply_port_override(&mut config, port.as_deref())?;

    Ok(config)
}

/// Handles --check-config: prints the effective configuration
fn handle_check_config(config: &Config) {
    println!("=== GTM-Probe Configuration ===\n");

    println!("Server:");
    println!("  Bind address: {}", config.server.bind_address);
    println!("  Port: {}", config.server.port);

    println!("\nFetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  User-Agent: {}", config.fetcher.user_agent);
    println!("  Accept: {}", config.fetcher.accept);
    println!("  Accept-Language: {}", config.fetcher.accept_language);

    println!("\nJobs:");
    println!("  Retention: {}s", config.jobs.retention_secs);
    println!("  Sweep interval: {}s", config.jobs.sweep_interval_secs);

    println!("\n✓ Configuration is valid");
}

/// Handles --analyze: one synchronous analysis
async fn handle_analyze(config: &Config, url: &str) -> anyhow::Result<()> {
    let target = gtm_probe::parse_target_url(url).with_context(|| format!("Invalid URL: {}", url))?;

    let fetcher = HttpFetcher::from_config(&config.fetcher)?;
    let scheduler = Scheduler::new(
        Arc::new(MemoryJobStore::new()),
        Arc::new(fetcher),
        Arc::new(Analyzer::new()),
    );

    let result = scheduler
        .analyze_now(target.as_str())
        .await
        .with_context(|| format!("Failed to analyze {}", target))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handles the default mode: runs the HTTP service
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let fetcher = HttpFetcher::from_config(&config.fetcher)?;

    let analyzer = Analyzer::new();
    tracing::info!("Detectors: {}", analyzer.detector_names().join(", "));

    let scheduler = Scheduler::with_clock(
        store.clone(),
        Arc::new(fetcher),
        Arc::new(analyzer),
        clock.clone(),
    );

    let sweeper = spawn_retention_sweeper(
        store,
        clock.clone(),
        Duration::from_secs(config.jobs.retention_secs),
        Duration::from_secs(config.jobs.sweep_interval_secs),
    );

    let ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = AppState::new(scheduler, clock);
    let result = gateway::serve(listener, state, shutdown_signal()).await;

    sweeper.abort();
    match result {
        Ok(()) => {
            tracing::info!("Server stopped");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Server failed: {}", e);
            Err(e.into())
        }
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
