//! Site-Scrape main entry point
//!
//! This is the command-line interface for the Site-Scrape crawler.

use anyhow::Context;
use clap::Parser;
use site_scrape::config::{compute_config_hash, parse_config, validate, validate_seed_url, Config};
use site_scrape::crawler::run_crawl;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Site-Scrape: a depth-bounded, same-domain site crawler
///
/// Crawls every page reachable from INITIAL_URL on the same host, up to
/// MAX_DEPTH links away, and records each page's title and links in a SQLite
/// database. Running the same command again resumes an interrupted crawl.
#[derive(Parser, Debug)]
#[command(name = "scrape")]
#[command(version)]
#[command(about = "A depth-bounded, same-domain site crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "INITIAL_URL")]
    initial_url: String,

    /// How many links away from the initial URL to go
    #[arg(value_name = "MAX_DEPTH")]
    max_depth: u32,

    /// SQLite database file for the results
    #[arg(long = "db_file", value_name = "PATH")]
    db_file: Option<PathBuf>,

    /// Size of the worker pool
    #[arg(long = "max_threads", value_name = "N")]
    max_threads: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log file, written alongside stdout
    #[arg(long = "log_file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => parse_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_path))?;

    if let Some(path) = &cli.config {
        let hash = compute_config_hash(path)?;
        tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        );
    }

    let seed = validate_seed_url(&cli.initial_url).context("Invalid initial URL")?;

    let report = run_crawl(&config, &seed)
        .await
        .context("Failed to start crawl")?;

    tracing::info!(
        "Crawl {}: {} pages fetched, {} failed, {} written, {} write errors",
        report.outcome,
        report.pages_fetched,
        report.pages_failed,
        report.pages_written,
        report.write_failures
    );

    Ok(())
}

/// Positional arguments and flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    config.crawler.max_depth = cli.max_depth;
    if let Some(threads) = cli.max_threads {
        config.crawler.max_threads = threads;
    }
    if let Some(db) = &cli.db_file {
        config.output.database_path = db.to_string_lossy().into_owned();
    }
    if let Some(log) = &cli.log_file {
        config.output.log_path = log.to_string_lossy().into_owned();
    }
}

/// Local wall-clock timestamps for log lines
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Every line goes to stdout and is appended to `log_path`.
fn setup_logging(verbose: u8, quiet: bool, log_path: &Path) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_scrape=info,scrape=info,warn"),
            1 => EnvFilter::new("site_scrape=debug,scrape=debug,info"),
            2 => EnvFilter::new("site_scrape=trace,scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let log_file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTimer)
        .with_target(false);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTimer)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(())
}
