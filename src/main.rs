//! Chapterline main entry point
//!
//! Command-line interface for the Chapterline web-novel archiver.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chapterline::config::{load_config_with_hash, Config};
use chapterline::crawler::crawl;

/// Chapterline: a resumable web-novel archiver
///
/// Chapterline walks a paginated novel catalog, probes each novel's
/// chapters sequentially, and writes everything into a local dataset
/// directory. Interrupted runs resume where they left off by default.
#[derive(Parser, Debug)]
#[command(name = "chapterline")]
#[command(version = "1.0.0")]
#[command(about = "A resumable web-novel archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an interrupted crawl (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh crawl, ignoring previous state
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the dataset directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("chapterline=info,warn"),
            1 => EnvFilter::new("chapterline=debug,info"),
            2 => EnvFilter::new("chapterline=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Chapterline Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Listing path: {}", config.crawler.listing_path);

    println!("\nLimits:");
    println!("  Max novels: {}", config.crawler.max_novels);
    println!(
        "  Max chapters per novel: {}",
        config.crawler.max_chapters_per_novel
    );
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} novels from {}{}",
        config.crawler.max_novels, config.crawler.base_url, config.crawler.listing_path
    );
}

/// Handles the --stats mode: shows statistics for the dataset directory
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use chapterline::output::{load_statistics, print_statistics};
    use chapterline::Archive;

    let archive = Archive::open(&config.output.data_dir)
        .with_context(|| format!("open dataset directory {}", config.output.data_dir))?;
    let stats = load_statistics(&archive);
    print_statistics(&stats);
    Ok(())
}

/// Handles the main crawl operation. Crawl failures are logged, not
/// surfaced through the exit code.
async fn handle_crawl(config: Config, fresh: bool) {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume if interrupted run exists)");
    }

    match crawl(config, fresh).await {
        Ok(()) => tracing::info!("Crawl completed successfully"),
        Err(e) => tracing::error!("Crawl failed: {}", e),
    }
}
