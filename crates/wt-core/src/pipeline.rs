//! The report pipeline: filter history, fetch metadata, accumulate, write.
//!
//! # Ordering assumption
//!
//! History exports are newest first. Iteration stops at the first entry older
//! than the requested start day, so an out-of-order history silently loses
//! every entry after that point. Order violations are detected and logged as a
//! warning and reported in [`Aggregation::out_of_order`]; the early stop is kept.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::aggregate::WatchStats;
use crate::error::Result;
use crate::fetch::MetadataFetcher;
use crate::history::WatchEvent;
use crate::range::{DateFilter, DayRange};
use crate::report;

/// Why an entry in range contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry has no video URL.
    NoUrl,
    /// The downloader produced no metadata.
    MetadataUnavailable,
}

/// An in-range entry that was not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// 1-based position in the history.
    pub position: usize,
    pub url: Option<String>,
    pub reason: SkipReason,
}

/// Result of walking the history.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub stats: WatchStats,
    /// Report days, or `None` when there is nothing to anchor the start on.
    pub range: Option<DayRange>,
    /// Entries whose minutes were counted.
    pub counted: usize,
    pub skipped: Vec<SkippedEntry>,
    /// Iteration ended at an entry older than the start day.
    pub stopped_early: bool,
    /// Some entry was newer than the one before it.
    pub out_of_order: bool,
}

impl Aggregation {
    /// Number of skipped entries with the given reason.
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|entry| entry.reason == reason).count()
    }
}

/// Walks `history` newest first, fetching and accumulating every entry in `filter`.
///
/// Timestamps are parsed as entries are reached; a malformed one past the early
/// stop is never read.
pub fn aggregate_history<F>(
    history: &[WatchEvent],
    filter: DateFilter,
    fetcher: &mut F,
) -> Result<Aggregation>
where
    F: MetadataFetcher + ?Sized,
{
    let mut agg = Aggregation::default();
    let mut previous: Option<NaiveDateTime> = None;
    let mut oldest_seen = None;

    for (idx, event) in history.iter().enumerate() {
        let position = idx + 1;
        let timestamp = event.timestamp()?;
        let day = timestamp.date();

        if previous.is_some_and(|prev| timestamp > prev) && !agg.out_of_order {
            agg.out_of_order = true;
            tracing::warn!(
                position,
                %timestamp,
                "watch history is not in newest-first order; entries may be missed"
            );
        }
        previous = Some(timestamp);
        oldest_seen = Some(day);

        if filter.is_before_start(day) {
            tracing::debug!(position, %day, "reached entries older than the start day");
            agg.stopped_early = true;
            break;
        }
        if filter.is_after_end(day) {
            continue;
        }

        let Some(url) = event.url.as_deref() else {
            tracing::warn!(
                position,
                title = event.title.as_deref().unwrap_or_default(),
                "history entry has no video URL, skipping"
            );
            agg.skipped.push(SkippedEntry {
                position,
                url: None,
                reason: SkipReason::NoUrl,
            });
            continue;
        };

        match fetcher.fetch(position, url)? {
            Some(metadata) => {
                let minutes = metadata.minutes();
                tracing::debug!(
                    position,
                    %day,
                    channel = %metadata.channel,
                    minutes,
                    "counted video"
                );
                agg.stats.record(day, &metadata.channel, minutes);
                agg.counted += 1;
            }
            None => {
                tracing::warn!(%url, "could not retrieve stats for video");
                agg.skipped.push(SkippedEntry {
                    position,
                    url: Some(url.to_string()),
                    reason: SkipReason::MetadataUnavailable,
                });
            }
        }
    }

    agg.range = filter
        .from
        .or(oldest_seen)
        .map(|from| DayRange { from, to: filter.to });
    Ok(agg)
}

/// Aggregates `history` and writes the CSV report to `output`.
pub fn generate_report<F>(
    history: &[WatchEvent],
    filter: DateFilter,
    fetcher: &mut F,
    output: &Path,
) -> Result<Aggregation>
where
    F: MetadataFetcher + ?Sized,
{
    tracing::info!("Starting...");
    let agg = aggregate_history(history, filter, fetcher)?;
    report::write_report_file(output, &agg.stats, agg.range)?;
    tracing::info!(
        counted = agg.counted,
        skipped = agg.skipped.len(),
        channels = agg.stats.totals.len(),
        output = %output.display(),
        "DONE !"
    );
    Ok(agg)
}
