//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wt_core::DownloaderConfig;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Downloader program used to fetch video metadata.
    pub downloader: String,

    /// Extra arguments passed to the downloader before the metadata-only flags.
    #[serde(default)]
    pub downloader_args: Vec<String>,

    /// Name prefix of the temporary directory holding metadata sidecars.
    pub scratch_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        let downloader = DownloaderConfig::default();
        Self {
            downloader: downloader.program,
            downloader_args: downloader.args,
            scratch_prefix: downloader.scratch_prefix,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables (WT_*)
        figment = figment.merge(Env::prefixed("WT_"));

        figment.extract()
    }

    /// Downloader settings for the metadata fetcher.
    pub fn downloader_config(&self) -> DownloaderConfig {
        DownloaderConfig {
            program: self.downloader.clone(),
            args: self.downloader_args.clone(),
            scratch_prefix: self.scratch_prefix.clone(),
        }
    }
}

/// Returns the platform-specific config directory for wt.
///
/// On Linux: `~/.config/wt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wt"))
}
