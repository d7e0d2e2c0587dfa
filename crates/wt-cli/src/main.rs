use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::run::{self, Terminal};
use wt_cli::{Cli, Config};
use wt_core::SkipReason;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Info by default so downloader output and skipped videos are visible
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdin = io::stdin();
    let stderr = io::stderr();
    let terminal = Terminal {
        interactive: stdin.is_terminal(),
        input: stdin.lock(),
        output: stderr.lock(),
    };

    let today = Local::now().date_naive();
    let Some(agg) = run::run(&cli, &config, today, terminal)? else {
        return Ok(());
    };

    let days = agg.range.map_or(0, |range| range.days().count());
    println!(
        "Wrote {days} days across {} channels to {}",
        agg.stats.totals.len(),
        cli.output_filepath.display()
    );
    let unavailable = agg.skipped_for(SkipReason::MetadataUnavailable);
    if unavailable > 0 {
        println!("Skipped {unavailable} videos without metadata");
    }
    let without_url = agg.skipped_for(SkipReason::NoUrl);
    if without_url > 0 {
        println!("Skipped {without_url} entries without a video URL");
    }

    Ok(())
}
