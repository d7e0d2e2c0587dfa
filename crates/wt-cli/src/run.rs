//! The report command: validate, confirm, fetch, write.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use wt_core::{Aggregation, DateFilter, DownloaderFetcher, HistorySummary, MetadataFetcher};

use crate::{Cli, Config, prompt};

/// Where the confirmation prompt reads from and writes to.
pub struct Terminal<R, W> {
    pub input: R,
    pub output: W,
    /// Whether `input` is a terminal a person can answer from.
    pub interactive: bool,
}

/// Runs the report with the configured downloader.
///
/// Returns `None` when the user declines the full-history scan.
pub fn run<R: BufRead, W: Write>(
    cli: &Cli,
    config: &Config,
    today: NaiveDate,
    terminal: Terminal<R, W>,
) -> Result<Option<Aggregation>> {
    run_with(cli, today, terminal, || {
        DownloaderFetcher::new(&config.downloader_config())
            .context("failed to prepare metadata scratch directory")
    })
}

/// Runs the report with a caller-supplied fetcher, built only once the run is confirmed.
pub fn run_with<R, W, F, M>(
    cli: &Cli,
    today: NaiveDate,
    terminal: Terminal<R, W>,
    make_fetcher: M,
) -> Result<Option<Aggregation>>
where
    R: BufRead,
    W: Write,
    F: MetadataFetcher,
    M: FnOnce() -> Result<F>,
{
    let filter = DateFilter::new(cli.date_from, cli.date_to, today)?;
    let needs_confirmation = filter.from.is_none() && !cli.yes;
    if needs_confirmation && !terminal.interactive {
        bail!(
            "no --date-from given and stdin is not a terminal; \
             pass --yes to scan the whole history or --date-from to limit it"
        );
    }

    let history_path = &cli.watch_history_json_filepath;
    let history = wt_core::load_history(history_path)
        .with_context(|| format!("failed to load {}", history_path.display()))?;
    match wt_core::describe_history(&history) {
        Ok(line) => tracing::info!("{line}"),
        Err(err) => tracing::warn!("could not summarize watch history: {err}"),
    }

    if needs_confirmation {
        let summary = HistorySummary::from_history(&history).ok().flatten();
        if !prompt::confirm_full_scan(terminal.input, terminal.output, summary.as_ref())? {
            tracing::debug!("full history scan declined");
            return Ok(None);
        }
    }

    let mut fetcher = make_fetcher()?;
    let agg = wt_core::generate_report(&history, filter, &mut fetcher, &cli.output_filepath)
        .with_context(|| format!("failed to generate {}", cli.output_filepath.display()))?;
    Ok(Some(agg))
}
