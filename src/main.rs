//! Seedwatch main entry point
//!
//! Loads the configuration, starts the scheduled crawler and serves the query
//! API. SIGHUP reloads the configuration file.

use anyhow::{Context, Result};
use clap::Parser;
use seedwatch::api::{self, AppState};
use seedwatch::config::{load_config_with_hash, Config, ScraperConfig};
use seedwatch::crawler::{Coordinator, ScrapeLoop};
use seedwatch::index::MemoryIndex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

type LogHandle = reload::Handle<EnvFilter, Registry>;

/// Seedwatch: a scheduled crawler with a searchable page snapshot
///
/// Seedwatch re-crawls a watchlist of seed URLs once they go stale, follows
/// their links up to a depth limit, persists what it finds and serves it
/// over HTTP.
#[derive(Parser, Debug)]
#[command(name = "seedwatch")]
#[command(version)]
#[command(about = "A scheduled crawler with a searchable page snapshot", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Override the configured listen address
    #[arg(long, value_name = "ADDR")]
    listen_addr: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if let Some(addr) = &cli.listen_addr {
        config.listen_address = addr.clone();
    }
    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_address))?;

    if cli.dry_run {
        print_dry_run(&config, addr);
        return Ok(());
    }

    let log_handle = setup_logging(&config.scraper, cli.verbose, cli.quiet);
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    let index = Arc::new(MemoryIndex::new());
    let coordinator = Arc::new(Coordinator::new(config.scraper, index.clone()));

    spawn_reload_listener(
        cli.config.clone(),
        config_hash,
        Arc::clone(&coordinator),
        log_handle,
        cli.verbose,
        cli.quiet,
    )?;

    let crawl = tokio::spawn(ScrapeLoop::new(Arc::clone(&coordinator)).run_forever());
    let router = api::create_router(AppState::new(coordinator, index));

    tokio::select! {
        served = api::serve(addr, router) => {
            served.with_context(|| format!("API server on {} failed", addr))?;
        }
        crawled = crawl => {
            match crawled.context("Scrape loop panicked")? {
                Ok(never) => match never {},
                Err(e) => return Err(e).context("Failed to restore crawl state"),
            }
        }
    }

    Ok(())
}

/// Picks the log filter for the given configuration and CLI flags
///
/// `RUST_LOG` wins over everything. Otherwise the louder of the CLI `-v`
/// count and the config's verbose/debug flags is used.
fn build_filter(config: &ScraperConfig, verbose: u8, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if quiet {
        return EnvFilter::new("error");
    }

    let configured = if config.debug {
        2
    } else if config.verbose {
        1
    } else {
        0
    };
    match verbose.max(configured) {
        0 => EnvFilter::new("seedwatch=info,warn"),
        1 => EnvFilter::new("seedwatch=debug,info"),
        2 => EnvFilter::new("seedwatch=trace,info"),
        _ => EnvFilter::new("trace"),
    }
}

/// Sets up the tracing subscriber with a reloadable filter
fn setup_logging(config: &ScraperConfig, verbose: u8, quiet: bool) -> LogHandle {
    let (filter, handle) = reload::Layer::new(build_filter(config, verbose, quiet));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();

    handle
}

/// Reloads the configuration file on every SIGHUP
///
/// A file that fails to load or validate leaves the running configuration in
/// place. The listen address is only read at startup.
#[cfg(unix)]
fn spawn_reload_listener(
    path: PathBuf,
    mut config_hash: String,
    coordinator: Arc<Coordinator>,
    log_handle: LogHandle,
    verbose: u8,
    quiet: bool,
) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup()).context("Failed to listen for SIGHUP")?;

    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            tracing::info!("Reloading config from {}", path.display());

            let (config, hash) = match load_config_with_hash(&path) {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::error!("Failed to reload configuration, keeping previous: {}", e);
                    continue;
                }
            };
            if hash == config_hash {
                tracing::info!("Configuration unchanged (hash: {})", hash);
                continue;
            }
            config_hash = hash;

            if let Err(e) = log_handle.reload(build_filter(&config.scraper, verbose, quiet)) {
                tracing::warn!("Failed to update log filter: {}", e);
            }
            coordinator.update_config(config.scraper);
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn spawn_reload_listener(
    _path: PathBuf,
    _config_hash: String,
    _coordinator: Arc<Coordinator>,
    _log_handle: LogHandle,
    _verbose: u8,
    _quiet: bool,
) -> Result<()> {
    tracing::warn!("Configuration reload is only supported on unix");
    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config, addr: SocketAddr) {
    let scraper = &config.scraper;

    println!("=== Seedwatch Dry Run ===\n");

    println!("Listen address: {}", addr);

    println!("\nCrawler Configuration:");
    println!("  Max age: {}s", scraper.maxage);
    println!("  Max depth: {}", scraper.max_depth);
    println!("  Max concurrent visits: {}", scraper.max_concurrent_visits);
    println!("  User agent: {}", scraper.user_agent);
    match scraper.save_path() {
        Some(path) => println!("  Save file: {}", path.display()),
        None => println!("  Save file: (persistence disabled)"),
    }

    println!("\nURL Filters ({}):", scraper.url_filters.len());
    for filter in &scraper.url_filters {
        println!("  - {}", filter);
    }

    println!("\nSeeds ({}):", scraper.seeds.len());
    for seed in &scraper.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}
