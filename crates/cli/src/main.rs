mod config;
mod logging;

use airtable_adapter::AirtableStore;
use anyhow::Context;
use clap::Parser;
use config::AppConfig;
use http_adapter::ScrapeCreatorsTransport;
use reel_core::application::{RunSummary, Runner};
use reel_core::fetcher::Fetcher;
use reel_core::ports::ThreadSleeper;
use reel_core::roster::Roster;
use reel_core::upsert::Upserter;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Collects Instagram profile and reel metrics and upserts them into Airtable
#[derive(Parser, Debug)]
#[command(name = "reel-sync")]
#[command(about = "Fetches profile and reel metrics for a roster of handles and upserts them into Airtable")]
struct Cli {
    /// Process only the first few production handles
    #[arg(long, conflicts_with_all = ["roster_file", "only"])]
    testing: bool,

    /// Read handles from a file (one per line, '#' starts a comment)
    #[arg(short = 'r', long = "roster-file", conflicts_with = "only")]
    roster_file: Option<PathBuf>,

    /// Process a single handle
    #[arg(long = "only")]
    only: Option<String>,

    /// Seconds to wait between handles (overrides REQUEST_DELAY_SECS)
    #[arg(long = "delay-secs")]
    delay_secs: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    logging::init_tracing("info")?;

    let config = AppConfig::from_env().context("loading configuration")?;
    let roster = select_roster(cli)?;
    anyhow::ensure!(!roster.is_empty(), "roster is empty");
    info!(mode = mode_name(cli), handles = roster.len(), "roster loaded");

    let mut run_config = config.run_config();
    if let Some(secs) = cli.delay_secs {
        run_config.request_delay = Duration::from_secs(secs);
    }

    // Instantiate the concrete adapters behind the core ports
    let transport = ScrapeCreatorsTransport::new(
        &config.scrapecreators_base_url,
        &config.scrapecreators_api_key,
    )
    .context("building scraping API client")?;
    let store = AirtableStore::new(&config.airtable_api_url, &config.base_id, &config.airtable_token)
        .context("building Airtable client")?;

    let fetcher = Fetcher::new(
        Box::new(transport),
        Box::new(ThreadSleeper),
        config.fetch_settings(),
    );
    let mut runner = Runner::new(
        fetcher,
        Upserter::new(Box::new(store)),
        Box::new(ThreadSleeper),
        run_config,
    );

    Ok(runner.run(&roster))
}

fn select_roster(cli: &Cli) -> anyhow::Result<Roster> {
    if let Some(handle) = &cli.only {
        return Ok(Roster::from_handles([handle]));
    }
    if let Some(path) = &cli.roster_file {
        return Ok(Roster::from_file(path)?);
    }
    if cli.testing {
        return Ok(Roster::testing());
    }
    Ok(Roster::production())
}

fn mode_name(cli: &Cli) -> &'static str {
    if cli.only.is_some() {
        "single"
    } else if cli.roster_file.is_some() {
        "file"
    } else if cli.testing {
        "testing"
    } else {
        "production"
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Data collection and Airtable update complete.");
    println!(
        "Successfully processed {} profiles and {} reels",
        summary.profiles_ok, summary.reels_ok
    );
    println!(
        "Failed to process {} profiles and {} reels",
        summary.profiles_failed, summary.reels_failed
    );
    println!(
        "Reel rows written: {} ({} items skipped)",
        summary.reels_written, summary.reels_skipped
    );
    println!("Total usernames processed: {}", summary.usernames);
}
