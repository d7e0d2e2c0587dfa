//! Watch history loading.
//!
//! The history export is a JSON array of entries, newest first:
//!
//! ```json
//! [{"title": "Watched ...", "titleUrl": "https://...", "time": "2024-01-02T10:00:00.123Z"}]
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Days before the newest entry that [`HistorySummary::suggested_range`] reaches back.
const SUGGESTED_SPAN_DAYS: i64 = 30;

/// One watched-video record from the history export.
///
/// The timestamp is kept as exported and parsed on access, so a malformed
/// `time` only matters for entries the pipeline actually reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// When the video was watched, ISO-8601 (UTC wall clock).
    pub time: String,
    /// The watched video's URL. Exports omit it for removed videos.
    pub url: Option<String>,
    /// Display title, used in diagnostics only.
    pub title: Option<String>,
}

impl WatchEvent {
    pub fn timestamp(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.time)
    }

    /// The calendar day this event is bucketed into.
    pub fn day(&self) -> Result<NaiveDate> {
        Ok(self.timestamp()?.date())
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    time: String,
    #[serde(default, rename = "titleUrl")]
    title_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl From<RawEntry> for WatchEvent {
    fn from(raw: RawEntry) -> Self {
        Self {
            time: raw.time,
            url: raw.title_url.filter(|url| !url.trim().is_empty()),
            title: raw.title,
        }
    }
}

/// Parses an ISO-8601 history timestamp, ignoring a trailing `Z`.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('Z');

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    // Explicit offsets are normalized to UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(value.trim()) {
        return Ok(dt.naive_utc());
    }

    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(Error::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Parses a history document already read into memory.
pub fn parse_history(json: &str, path: &Path) -> Result<Vec<WatchEvent>> {
    let raw: Vec<RawEntry> = serde_json::from_str(json).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw.into_iter().map(WatchEvent::from).collect())
}

/// Loads the watch history export at `path`, preserving file order.
pub fn load_history(path: &Path) -> Result<Vec<WatchEvent>> {
    let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let events = parse_history(&json, path)?;
    tracing::debug!(path = %path.display(), count = events.len(), "loaded watch history");
    Ok(events)
}

/// Entry count and day span of a history, trusting newest-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySummary {
    pub count: usize,
    pub oldest: NaiveDate,
    pub newest: NaiveDate,
}

impl HistorySummary {
    /// Summarizes `history`, or returns `None` when it is empty.
    pub fn from_history(history: &[WatchEvent]) -> Result<Option<Self>> {
        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Ok(None);
        };
        Ok(Some(Self {
            count: history.len(),
            oldest: last.day()?,
            newest: first.day()?,
        }))
    }

    /// A default reporting range: the last month of history, clamped to the oldest entry.
    pub fn suggested_range(&self) -> (NaiveDate, NaiveDate) {
        let month_back = self.newest - Duration::days(SUGGESTED_SPAN_DAYS);
        (self.oldest.max(month_back), self.newest)
    }
}

impl fmt::Display for HistorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} entries from {} to {}",
            self.count, self.oldest, self.newest
        )
    }
}

/// Human-readable summary line, including the empty case.
pub fn describe_history(history: &[WatchEvent]) -> Result<String> {
    Ok(HistorySummary::from_history(history)?
        .map_or_else(|| "Empty watch history".to_string(), |s| s.to_string()))
}
