//! Caissa-Harvest main entry point
//!
//! Command-line interface for the chess knowledge harvester.

use caissa_harvest::config::load_config_with_hash;
use caissa_harvest::crawler::run_harvest;
use caissa_harvest::discovery::TOPIC_QUERIES;
use caissa_harvest::knowledge::Category;
use caissa_harvest::store::KnowledgeStore;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Caissa-Harvest: a chess knowledge harvester
///
/// Discovers chess pages through a search service, renders them through a
/// remote browser, extracts typed knowledge records with a language model,
/// and persists them as a deduplicated, indexed knowledge base.
#[derive(Parser, Debug)]
#[command(name = "caissa-harvest")]
#[command(version = "0.3.0")]
#[command(about = "A chess knowledge harvester", long_about = None)]
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

    /// Validate config and show the harvest plan without running it
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show knowledge base statistics and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Credentials come from the environment; a local .env is honored
    let _ = dotenvy::dotenv();

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
    } else if cli.stats {
        handle_stats(&config);
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("caissa_harvest=info,warn"),
            1 => EnvFilter::new("caissa_harvest=debug,info"),
            2 => EnvFilter::new("caissa_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the harvest plan
fn handle_dry_run(config: &caissa_harvest::config::Config, config_hash: &str) {
    println!("=== Caissa-Harvest Dry Run ===\n");

    println!("Config hash: {}", config_hash);

    println!("\nCrawl Budgets:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth (reserved): {}", config.crawler.max_depth);
    println!("  Page retries: {}", config.crawler.max_page_retries);
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Query delay: {}ms", config.crawler.query_delay_ms);
    println!("  Extraction delay: {}ms", config.crawler.extraction_delay_ms);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );

    println!("\nRendering Service:");
    println!("  Endpoint: {}", config.browser.endpoint);
    println!("  Connect retries: {}", config.browser.connect_retries);
    println!("  Connect backoff: {}ms", config.browser.connect_backoff_ms);
    println!(
        "  Viewport: {}x{}",
        config.browser.viewport_width, config.browser.viewport_height
    );

    println!("\nDiscovery:");
    println!("  Endpoint: {}", config.discovery.endpoint);
    println!("  Results per query: {}", config.discovery.results_per_query);
    println!("  Language: {}", config.discovery.language);

    println!("\nExtraction:");
    println!("  Endpoint: {}", config.extraction.endpoint);
    println!("  Model: {}", config.extraction.model);
    println!("  Max output tokens: {}", config.extraction.max_output_tokens);

    println!("\nOutput:");
    println!("  Knowledge directory: {}", config.output.knowledge_dir);

    println!("\nQuery Battery ({} queries):", TOPIC_QUERIES.len());
    for query in TOPIC_QUERIES {
        println!("  - {}", query);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest up to {} pages from {} discovery queries",
        config.crawler.max_pages,
        TOPIC_QUERIES.len()
    );
}

/// Handles the --stats mode: summarizes the knowledge base manifest
fn handle_stats(config: &caissa_harvest::config::Config) {
    println!("Knowledge base: {}\n", config.output.knowledge_dir);

    let store = KnowledgeStore::new(&config.output.knowledge_dir);
    let manifest = store.load_manifest();

    if manifest.items.is_empty() {
        println!("No knowledge items indexed yet.");
        return;
    }

    println!("Items by category:");
    for category in Category::ALL {
        let count = manifest
            .items
            .iter()
            .filter(|entry| entry.class == category)
            .count();
        if count > 0 {
            println!("  {:20} {}", category.to_string(), count);
        }
    }

    let sources: std::collections::HashSet<&str> = manifest
        .items
        .iter()
        .map(|entry| entry.source.as_str())
        .collect();

    println!("\nTotal items: {}", manifest.items.len());
    println!("Distinct sources: {}", sources.len());
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: caissa_harvest::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting harvest: {} queries, page budget {}",
        TOPIC_QUERIES.len(),
        config.crawler.max_pages
    );

    match run_harvest(config).await {
        Ok(report) => {
            println!("\n=== Harvest Report ===");
            println!("URLs discovered:   {}", report.urls_discovered);
            println!("Pages processed:   {}", report.pages_processed);
            println!("Items extracted:   {}", report.items_extracted);
            println!("Session recoveries: {}", report.recoveries);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
