//! Core domain logic for the watch time tracker.
//!
//! This crate contains:
//! - History loading: parsing the watch history export
//! - Metadata fetching: asking an external downloader for channel and duration
//! - Aggregation: minutes per day and channel over a date range
//! - Reporting: the CSV grid

mod aggregate;
mod error;
pub mod fetch;
pub mod history;
pub mod pipeline;
pub mod range;
pub mod report;

pub use aggregate::{ChannelTotals, DailyChannelStats, WatchStats};
pub use error::{Error, Result};
pub use fetch::{DownloaderConfig, DownloaderFetcher, MetadataFetcher, VideoMetadata};
pub use history::{HistorySummary, WatchEvent, describe_history, load_history};
pub use pipeline::{Aggregation, SkipReason, SkippedEntry, aggregate_history, generate_report};
pub use range::{DateFilter, DayRange, parse_day};
