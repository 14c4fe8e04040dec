//! Register crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use register_crawler::{
    error::Result,
    models::{Category, Config},
    pipeline::{self, CategoryReport, ConsolidationSummary, Context, ListReport, Progress},
    services::HttpFetcher,
    storage::LocalStorage,
};

/// Public-register crawler
#[derive(Parser, Debug)]
#[command(
    name = "register-crawler",
    version,
    about = "Crawls a regulator's public register into JSON/CSV datasets"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a category's list pages and write its manifest
    List { category: Category },

    /// Fetch detail pages for manifest entries not yet persisted
    Details { category: Category },

    /// Merge persisted records into aggregate JSON/CSV
    Consolidate { category: Category },

    /// Run list, details and consolidation for one category
    Run { category: Category },

    /// Run every configured category in order
    All,

    /// Validate the configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn log_list(report: &ListReport) {
    log::info!(
        "{} list: {} scraped, {} unique across {} partition(s) in {}s -> {}",
        report.category.label(),
        report.scraped,
        report.unique,
        report.partitions,
        (report.finished_at - report.started_at).num_seconds(),
        report.manifest_key
    );
}

fn log_details(progress: &Progress) {
    log::info!(
        "{} details: {} | {} resumed, {} new, {} dropped",
        progress.category.label(),
        progress.status_line(),
        progress.resumed,
        progress.persisted_this_run(),
        progress.failed
    );
}

fn log_consolidation(summary: &ConsolidationSummary) {
    log::info!(
        "{} aggregate: {} records, {} columns ({} skipped) -> {}",
        summary.category.label(),
        summary.records,
        summary.columns,
        summary.skipped,
        summary.csv_key
    );
}

fn log_category(report: &CategoryReport) {
    log_list(&report.list);
    if let Some(details) = &report.details {
        log_details(details);
    }
    if let Some(summary) = &report.consolidation {
        log_consolidation(summary);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Configuration path: {}", cli.config.display());

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!(
            "Config OK ({} categories, base URL {})",
            config.categories.len(),
            config.crawler.base_url
        );
        return Ok(());
    }

    config.validate()?;

    let fetcher = HttpFetcher::new(&config.crawler)?;
    let storage = LocalStorage::new(&config.paths.output_root);
    let ctx = Context::new(&config, &fetcher, &storage)?;

    match cli.command {
        Command::List { category } => log_list(&pipeline::run_list(&ctx, category).await?),
        Command::Details { category } => {
            log_details(&pipeline::run_details(&ctx, category).await?)
        }
        Command::Consolidate { category } => {
            log_consolidation(&pipeline::run_consolidate(&ctx, category).await?)
        }
        Command::Run { category } => log_category(&pipeline::run_category(&ctx, category).await?),
        Command::All => {
            let categories: Vec<Category> = config.categories.iter().map(|p| p.category).collect();
            for (index, category) in categories.iter().enumerate() {
                log::info!(
                    "[{}/{}] {}",
                    index + 1,
                    categories.len(),
                    category.label()
                );
                log_category(&pipeline::run_category(&ctx, *category).await?);
            }
        }
        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}
