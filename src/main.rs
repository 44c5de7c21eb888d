//! Quote Harvest main entry point
//!
//! This is the command-line interface for the quote harvester.

use clap::Parser;
use quote_harvest::config::{load_config_with_hash, validate_run_parameters, Config};
use quote_harvest::crawler::run_harvest;
use quote_harvest::output::{export_records, load_statistics, print_run_summary, print_statistics};
use quote_harvest::state::SeedStatus;
use quote_harvest::storage::{open_storage, SeedStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Quote Harvest: a budgeted, concurrent quote harvester
///
/// Paginates every pending seed listing across a fixed worker pool, stores
/// the extracted quotes in SQLite, and exports them to CSV and JSON.
#[derive(Parser, Debug)]
#[command(name = "quote-harvest")]
#[command(version)]
#[command(about = "A budgeted, concurrent quote harvester", long_about = None)]
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

    /// Override the total request limit for this run
    #[arg(long, value_name = "N")]
    request_limit: Option<u64>,

    /// Override the number of concurrent workers for this run
    #[arg(long, value_name = "N")]
    pool_size: Option<usize>,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["stats", "import_seeds", "export_only"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "import_seeds", "export_only"])]
    stats: bool,

    /// Add the config's [[seed]] entries to the database as pending and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_only"])]
    import_seeds: bool,

    /// Export stored records without harvesting
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "import_seeds", "no_export"])]
    export_only: bool,

    /// Skip the export after harvesting
    #[arg(long)]
    no_export: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, cli.request_limit, cli.pool_size)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.import_seeds {
        handle_import_seeds(&config)?;
    } else if cli.export_only {
        handle_export(&config)?;
    } else {
        handle_harvest(&config).await?;
        if !cli.no_export {
            handle_export(&config)?;
        }
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
            0 => EnvFilter::new("quote_harvest=info,warn"),
            1 => EnvFilter::new("quote_harvest=debug,info"),
            2 => EnvFilter::new("quote_harvest=trace,debug"),
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

/// Applies command-line overrides to the run parameters
fn apply_overrides(
    config: &mut Config,
    request_limit: Option<u64>,
    pool_size: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(limit) = request_limit {
        config.harvest.request_limit = limit;
    }
    if let Some(size) = pool_size {
        config.harvest.pool_size = size;
    }

    validate_run_parameters(config.harvest.pool_size, config.harvest.request_limit)?;
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Quote Harvest Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Request limit: {}", config.harvest.request_limit);
    println!("  Pool size: {}", config.harvest.pool_size);
    println!("  Pending seed cap: {}", config.harvest.pending_seed_cap);
    println!("  Request timeout: {}s", config.harvest.request_timeout_secs);
    if let Some(template) = &config.harvest.page_url_template {
        println!("  Page URL template: {}", template);
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  CSV: {}", config.output.csv_path);
    println!("  JSON: {}", config.output.json_path);

    println!("\nConfigured Seeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {} ({})", seed.id, seed.page_url);
    }

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let pending = storage.find_by_status(SeedStatus::Pending, config.harvest.pending_seed_cap)?;

    println!("\nPending Seeds in Database ({}):", pending.len());
    for seed in &pending {
        println!("  - {} ({})", seed.id, seed.page_url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest {} pending seeds with at most {} requests",
        pending.len(),
        config.harvest.request_limit
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage, &storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --import-seeds mode: adds configured seeds as pending
fn handle_import_seeds(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    let mut added = 0;
    for seed in &config.seeds {
        if storage.upsert_seed(&seed.id, &seed.page_url)? {
            added += 1;
        }
    }

    tracing::info!(
        "Imported seeds: {} new, {} already known",
        added,
        config.seeds.len() - added
    );
    println!("✓ {} of {} seeds added", added, config.seeds.len());

    Ok(())
}

/// Exports every stored record to the configured CSV and JSON paths
fn handle_export(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    let written = export_records(
        &storage,
        Path::new(&config.output.csv_path),
        Path::new(&config.output.json_path),
    )?;

    if written > 0 {
        println!(
            "✓ Exported {} records to {} and {}",
            written, config.output.csv_path, config.output.json_path
        );
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting harvest: {} workers, request limit {}",
        config.harvest.pool_size,
        config.harvest.request_limit
    );

    match run_harvest(config).await {
        Ok(run) => {
            if run.seeds_submitted > 0 {
                print_run_summary(&run.summary());
                for failure in &run.failures {
                    tracing::warn!("Seed {} failed: {}", failure.seed_id, failure.reason);
                }
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
