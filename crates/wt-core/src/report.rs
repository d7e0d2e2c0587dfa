//! CSV report rendering.
//!
//! One row per calendar day, one column per channel:
//!
//! ```text
//! Day,TOTAL,X,Y
//! 2024-01-01,5,2,3
//! 2024-01-02,0,,
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::WatchStats;
use crate::error::{Error, Result};
use crate::range::DayRange;

pub const DAY_COLUMN: &str = "Day";
pub const TOTAL_COLUMN: &str = "TOTAL";

/// Header row: `Day`, `TOTAL`, then channels by descending total.
pub fn header(stats: &WatchStats) -> Vec<String> {
    [DAY_COLUMN, TOTAL_COLUMN]
        .into_iter()
        .chain(stats.totals.ranked())
        .map(str::to_string)
        .collect()
}

/// Data rows for every day in `range`. Channels absent on a day get an empty cell.
pub fn rows(stats: &WatchStats, range: Option<DayRange>) -> Vec<Vec<String>> {
    let channels = stats.totals.ranked();
    let Some(range) = range else {
        return Vec::new();
    };

    range
        .days()
        .map(|day| {
            let minutes = stats.daily.day(day);
            let mut row = Vec::with_capacity(channels.len() + 2);
            row.push(day.format("%Y-%m-%d").to_string());
            row.push(stats.daily.day_total(day).to_string());
            row.extend(channels.iter().map(|channel| {
                minutes
                    .and_then(|m| m.get(*channel))
                    .map_or_else(String::new, ToString::to_string)
            }));
            row
        })
        .collect()
}

/// Writes the report as CSV to `writer`.
pub fn write_report<W: Write>(
    writer: W,
    stats: &WatchStats,
    range: Option<DayRange>,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header(stats))?;
    for row in rows(stats, range) {
        csv.write_record(&row)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the report to a file at `path`, replacing any existing file.
pub fn write_report_file(path: &Path, stats: &WatchStats, range: Option<DayRange>) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_report(BufWriter::new(file), stats, range)?;
    tracing::debug!(path = %path.display(), "wrote report");
    Ok(())
}
