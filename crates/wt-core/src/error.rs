//! Error type for the core library.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout `wt-core`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building a watch time report.
#[derive(Debug, Error)]
pub enum Error {
    /// A `YYYY-MM-DD` argument could not be parsed.
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The requested range starts after it ends.
    #[error("date_from ({from}) must not be later than date_to ({to})")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// A history entry carried a timestamp we could not read.
    #[error("invalid timestamp {value:?} in watch history")]
    InvalidTimestamp { value: String },

    /// Reading or writing a file failed.
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document (history or metadata sidecar) was malformed.
    #[error("failed to parse {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The downloader could not be started.
    #[error("failed to run downloader {program:?}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The downloader was started but waiting for it to exit failed.
    #[error("failed to wait for downloader {program:?} to exit")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the CSV report failed.
    #[error("failed to write CSV report")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
