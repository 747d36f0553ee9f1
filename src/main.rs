//! Audit-Intel main entry point
//!
//! This is the command-line interface for the Audit-Intel contest collector.

use anyhow::Context;
use audit_intel::api::{ApiServer, ApiState};
use audit_intel::collector::{Code4renaCollector, Collector};
use audit_intel::config::{load_config_with_hash, Config};
use audit_intel::scheduler::{CollectionLoop, ScheduleConfig};
use audit_intel::storage::open_storage;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// Audit-Intel: a web3 audit contest collector
///
/// Audit-Intel periodically collects audit contest reports, stores their
/// findings in SQLite, and serves them over a small JSON API.
#[derive(Parser, Debug)]
#[command(name = "audit-intel")]
#[command(version)]
#[command(about = "A web3 audit contest collector", long_about = None)]
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

    /// Validate config and show what would be collected without collecting
    #[arg(long, conflicts_with_all = ["stats", "once"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "once"])]
    stats: bool,

    /// Run a single collection and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.once {
        handle_once(&config).await?;
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
            0 => EnvFilter::new("audit_intel=info,warn"),
            1 => EnvFilter::new("audit_intel=debug,info"),
            2 => EnvFilter::new("audit_intel=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Audit-Intel Dry Run ===\n");

    println!("Collector:");
    println!("  Platform: {}", config.collector.platform);
    println!("  Contest index: {}", config.collector.contests_url());
    println!("  Contests per run: {}", config.collector.limit);
    println!("  Max concurrent pages: {}", config.collector.max_concurrent);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.collector.request_timeout_secs, config.collector.connect_timeout_secs
    );

    println!("\nScheduler:");
    println!("  Interval: {}s", config.scheduler.interval_secs);
    println!("  Backoff: {}s", config.scheduler.backoff_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nAPI:");
    if config.api.enabled {
        println!("  Listen: http://{}", config.api.listen_addr());
        println!("  Workers: {}", config.api.workers);
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Raw data: {}", config.output.raw_data_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use audit_intel::output::{load_statistics, print_statistics};
    use audit_intel::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --once mode: one collection run, then exit
async fn handle_once(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let collector = Code4renaCollector::new(config, storage)?;

    let outcome = collector
        .collect_detailed(config.collector.limit)
        .await
        .context("Collection failed")?;

    println!(
        "Collected {} of {} contests from {}",
        outcome.reports.len(),
        outcome.contest_total,
        collector.platform()
    );
    for report in &outcome.reports {
        println!("  ✓ {} ({} findings)", report.title, report.findings.len());
    }
    for failure in &outcome.failures {
        println!("  ✗ {}: {}", failure.slug, failure.error);
    }

    Ok(())
}

/// Default mode: API plus scheduled collection until Ctrl-C
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let collector = Arc::new(Code4renaCollector::new(&config, storage.clone())?);
    let trigger = Arc::new(Notify::new());

    let api = if config.api.enabled {
        let state = ApiState::new(
            storage,
            Arc::clone(&trigger),
            vec![collector.platform().to_string()],
        );
        let server = ApiServer::bind(&config.api.listen_addr(), state)?;
        Some(server.spawn(config.api.workers)?)
    } else {
        tracing::info!("API disabled");
        None
    };

    let collection = CollectionLoop::new(collector, ScheduleConfig::from_config(&config), trigger);

    tokio::select! {
        _ = collection.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Shutting down");
        }
    }

    if let Some(api) = api {
        tokio::task::spawn_blocking(move || api.shutdown())
            .await
            .context("API shutdown failed")?;
    }

    Ok(())
}
