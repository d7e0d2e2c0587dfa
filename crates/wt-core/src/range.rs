//! Date range resolution.

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Parses a `YYYY-MM-DD` day.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| Error::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// The caller's requested range, before the history has been walked.
///
/// `from` stays open when absent; the pipeline closes it on the oldest
/// event it iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub from: Option<NaiveDate>,
    pub to: NaiveDate,
}

impl DateFilter {
    /// Validates the requested bounds, defaulting `to` to `today`.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Result<Self> {
        let to = to.unwrap_or(today);
        if let Some(from) = from {
            if from > to {
                return Err(Error::InvalidRange { from, to });
            }
        }
        Ok(Self { from, to })
    }

    /// True when the event's day is older than `from`, which ends iteration.
    pub fn is_before_start(&self, day: NaiveDate) -> bool {
        self.from.is_some_and(|from| day < from)
    }

    /// True when the event's day is newer than `to`, which skips the event.
    pub fn is_after_end(&self, day: NaiveDate) -> bool {
        day > self.to
    }
}

/// Inclusive range of report days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DayRange {
    /// Every calendar day from `from` to `to`, ascending. Empty if `from > to`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day <= to)
    }
}
