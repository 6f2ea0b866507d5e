//! Recruit-Scout main entry point
//!
//! This is the command-line interface for the Recruit-Scout scraper.

use anyhow::Context;
use chrono::FixedOffset;
use clap::Parser;
use recruit_scout::config::{load_config_with_hash, validate, Config};
use recruit_scout::crawler::Coordinator;
use recruit_scout::output::{compute_statistics, print_statistics};
use recruit_scout::JsonStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Recruit-Scout: an incremental forum recruitment scraper
///
/// Scrapes the forum listing for recruitment threads, merges them into the
/// JSON store, then fetches each thread's detail page. Without a config file
/// the built-in defaults are used.
#[derive(Parser, Debug)]
#[command(name = "recruit-scout")]
#[command(version)]
#[command(about = "An incremental forum recruitment scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the store path from the configuration
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only scrape the listing and merge it into the store
    #[arg(long, conflicts_with_all = ["details_only", "dry_run", "stats"])]
    listing_only: bool,

    /// Only crawl detail pages for items already in the store
    #[arg(long, conflicts_with_all = ["listing_only", "dry_run", "stats"])]
    details_only: bool,

    /// Validate config and show what would be done without any network access
    #[arg(long, conflicts_with_all = ["listing_only", "details_only", "stats"])]
    dry_run: bool,

    /// Show statistics for the store and exit
    #[arg(long, conflicts_with_all = ["listing_only", "details_only", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_ref())?;
    if let Some(store) = &cli.store {
        config.store.path = store.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.listing_only, cli.details_only).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("recruit_scout=info,warn"),
            1 => EnvFilter::new("recruit_scout=debug,info"),
            2 => EnvFilter::new("recruit_scout=trace,debug"),
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

/// Loads the config file if one was given, otherwise the defaults
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Recruit-Scout Dry Run ===\n");

    println!("Source:");
    println!("  Index URL: {}", config.source.index_url);
    println!("  Base URL: {}", config.source.base_url);
    println!("  Tag marker: {}", config.source.tag_marker);
    println!("  UTC offset: {:+}h", config.source.utc_offset_hours);

    println!("\nFetch:");
    println!("  Identity pool size: {}", config.fetch.user_agent_pool_size);
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!(
        "  Referer: {}",
        config.fetch.referer.as_deref().unwrap_or("(none)")
    );

    println!("\nStore:");
    println!("  Path: {}", config.store.path);
    println!("  Max items: {}", config.store.max_items);

    println!("\nCrawler:");
    println!("  Detail workers: {}", config.crawler.concurrency);

    let store = JsonStore::new(&config.store.path);
    let items = store.load();
    let pending = items.iter().filter(|item| !item.is_enriched()).count();

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Store holds {} items, {} would be sent to the detail crawl",
        items.len(),
        pending
    );
}

/// Handles the --stats mode: shows statistics for the store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = JsonStore::new(&config.store.path);
    println!("Store: {}\n", store.path().display());

    let items = store.load();
    let stats = compute_statistics(&items);
    let offset = FixedOffset::east_opt(config.source.utc_offset_hours * 3600)
        .context("utc_offset_hours out of range")?;

    print_statistics(&stats, offset);
    Ok(())
}

/// Handles the scrape: listing phase, detail phase, or both
async fn handle_crawl(
    config: Config,
    listing_only: bool,
    details_only: bool,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config).context("initializing crawler")?;

    if !details_only {
        let report = match coordinator.run_listing().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Listing phase failed: {}", e);
                return Err(e).context("fetching listing");
            }
        };
        println!(
            "Listing scraped: {} recruitment threads ({} with unreadable dates); store holds {} items at {}",
            report.scraped,
            report.fallback_timestamps,
            report.stored,
            coordinator.store().path().display()
        );
    }

    if !listing_only {
        let outcome = coordinator
            .run_details()
            .await
            .context("crawling detail pages")?;
        println!(
            "Detail pages fetched and parsed: {} ({} failed, {} already done, {} total ok)",
            outcome.enriched,
            outcome.failed,
            outcome.skipped,
            outcome.successful().len()
        );
    }

    Ok(())
}
