//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

/// Watch time tracker.
///
/// Extracts stats from your video watch history and writes a CSV file with
/// the minutes watched for each day and channel.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Path to the watch-history.json file.
    pub watch_history_json_filepath: PathBuf,

    /// Path to write the CSV file to.
    pub output_filepath: PathBuf,

    /// First day to include, YYYY-MM-DD (must not be after --date-to).
    ///
    /// When omitted the whole history is scanned.
    #[arg(long, value_parser = parse_day_arg)]
    pub date_from: Option<NaiveDate>,

    /// Last day to include, YYYY-MM-DD (default: today).
    #[arg(long, value_parser = parse_day_arg)]
    pub date_to: Option<NaiveDate>,

    /// Scan the entire history without asking when --date-from is omitted.
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn parse_day_arg(value: &str) -> Result<NaiveDate, String> {
    wt_core::parse_day(value).map_err(|e| e.to_string())
}
