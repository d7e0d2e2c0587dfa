//! Watch time tracker CLI library.
//!
//! This crate provides the CLI interface for the watch time tracker.

mod cli;
mod config;
pub mod prompt;
pub mod run;

pub use cli::Cli;
pub use config::Config;
