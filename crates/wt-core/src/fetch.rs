//! Per-video metadata retrieval.
//!
//! The pipeline only sees [`MetadataFetcher`]. [`DownloaderFetcher`] is the
//! production implementation: it shells out to a youtube-dl compatible
//! downloader asking for the info JSON only, then reads the sidecar back.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tempfile::TempDir;

use crate::error::{Error, Result};

/// The subset of the downloader's info JSON the report needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoMetadata {
    /// Uploader channel name.
    pub channel: String,
    /// Video length in seconds.
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
}

impl VideoMetadata {
    /// Duration in whole minutes, ties rounded to even.
    #[allow(clippy::cast_possible_truncation)]
    pub fn minutes(&self) -> i64 {
        (self.duration_seconds / 60.0).round_ties_even() as i64
    }
}

/// Source of per-video metadata.
pub trait MetadataFetcher {
    /// Fetches metadata for the history entry at 1-based `position`.
    ///
    /// Returns `Ok(None)` when the video's metadata could not be retrieved;
    /// the caller skips that entry.
    fn fetch(&mut self, position: usize, url: &str) -> Result<Option<VideoMetadata>>;
}

/// How to invoke the external downloader.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Program to run (e.g. `yt-dlp`).
    pub program: String,
    /// Extra arguments placed before the metadata-only flags.
    pub args: Vec<String>,
    /// Name prefix for the scratch directory.
    pub scratch_prefix: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            args: Vec::new(),
            scratch_prefix: "wt_metadata".to_string(),
        }
    }
}

/// Fetches metadata by running the downloader once per video.
///
/// Sidecars are written to a temporary directory removed when the fetcher is dropped.
#[derive(Debug)]
pub struct DownloaderFetcher {
    program: String,
    args: Vec<String>,
    scratch: TempDir,
}

impl DownloaderFetcher {
    pub fn new(config: &DownloaderConfig) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix(&config.scratch_prefix)
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        tracing::debug!(dir = %scratch.path().display(), "created metadata scratch directory");
        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
            scratch,
        })
    }

    /// Directory holding the sidecar files.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    fn output_prefix(&self, position: usize) -> PathBuf {
        self.scratch.path().join(format!("{position:05}"))
    }

    fn sidecar_path(&self, position: usize) -> PathBuf {
        self.scratch.path().join(format!("{position:05}.info.json"))
    }

    fn run_downloader(&self, prefix: &Path, url: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-o")
            .arg(prefix)
            .args(["--skip-download", "--write-info-json", "-i", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        std::thread::scope(|scope| {
            if let Some(stderr) = stderr {
                scope.spawn(move || log_lines(stderr, "stderr"));
            }
            if let Some(stdout) = stdout {
                log_lines(stdout, "stdout");
            }
        });

        let status = child.wait().map_err(|source| Error::Wait {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            tracing::debug!(%url, %status, "downloader exited unsuccessfully");
        }
        Ok(())
    }
}

impl MetadataFetcher for DownloaderFetcher {
    fn fetch(&mut self, position: usize, url: &str) -> Result<Option<VideoMetadata>> {
        self.run_downloader(&self.output_prefix(position), url)?;
        read_sidecar(&self.sidecar_path(position))
    }
}

/// Reads an info JSON sidecar. A missing file means the download failed.
pub fn read_sidecar(path: &Path) -> Result<Option<VideoMetadata>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    let metadata = serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(metadata))
}

/// Logs each line of downloader output as it arrives.
fn log_lines(reader: impl Read, stream: &'static str) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if !line.is_empty() {
                    tracing::info!(stream, "{line}");
                }
            }
            Err(e) => {
                tracing::debug!(stream, error = %e, "stopped reading downloader output");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(duration_seconds: f64) -> VideoMetadata {
        VideoMetadata {
            channel: "Chan".to_string(),
            duration_seconds,
        }
    }

    #[test]
    fn minutes_round_per_video() {
        assert_eq!(metadata(120.0).minutes(), 2);
        assert_eq!(metadata(89.0).minutes(), 1);
        assert_eq!(metadata(29.0).minutes(), 0);
        assert_eq!(metadata(3601.0).minutes(), 60);
    }

    #[test]
    fn minutes_round_half_to_even() {
        assert_eq!(metadata(30.0).minutes(), 0);
        assert_eq!(metadata(90.0).minutes(), 2);
        assert_eq!(metadata(150.0).minutes(), 2);
    }

    #[test]
    fn sidecar_ignores_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00001.info.json");
        fs::write(
            &path,
            r#"{"id": "abc", "title": "t", "channel": "Chan", "duration": 61, "view_count": 3}"#,
        )
        .unwrap();
        assert_eq!(read_sidecar(&path).unwrap(), Some(metadata(61.0)));
    }

    #[test]
    fn missing_sidecar_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_sidecar(&dir.path().join("00001.info.json")).unwrap(), None);
    }

    #[test]
    fn sidecar_without_duration_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00001.info.json");
        fs::write(&path, r#"{"channel": "Live now"}"#).unwrap();
        assert!(matches!(read_sidecar(&path), Err(Error::Json { .. })));
    }

    #[test]
    fn scratch_directory_is_removed_on_drop() {
        let fetcher = DownloaderFetcher::new(&DownloaderConfig::default()).unwrap();
        let dir = fetcher.scratch_dir().to_path_buf();
        assert!(dir.is_dir());
        assert!(
            dir.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("wt_metadata")
        );
        drop(fetcher);
        assert!(!dir.exists());
    }

    #[test]
    fn unknown_program_fails_to_spawn() {
        let config = DownloaderConfig {
            program: "wt-definitely-not-a-downloader".to_string(),
            ..DownloaderConfig::default()
        };
        let mut fetcher = DownloaderFetcher::new(&config).unwrap();
        let err = fetcher.fetch(1, "https://example.com/a").unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[cfg(unix)]
    mod downloader {
        use super::*;

        const FAKE_DOWNLOADER: &str = r#"
out=""
while [ $# -gt 1 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
  esac
  shift
done
url="$1"
echo "[info] fetching $url"
case "$url" in
  *missing*) echo "ERROR: video unavailable" >&2 ;;
  *broken*) echo 'not json' > "$out.info.json" ;;
  *) printf '{"channel": "Chan", "duration": 125.0}' > "$out.info.json" ;;
esac
"#;

        fn fake_fetcher(dir: &Path) -> DownloaderFetcher {
            let script = dir.join("fake-downloader.sh");
            fs::write(&script, FAKE_DOWNLOADER).unwrap();
            DownloaderFetcher::new(&DownloaderConfig {
                program: "sh".to_string(),
                args: vec![script.display().to_string()],
                scratch_prefix: "wt_test".to_string(),
            })
            .unwrap()
        }

        #[test]
        fn reads_sidecar_written_by_downloader() {
            let dir = tempfile::tempdir().unwrap();
            let mut fetcher = fake_fetcher(dir.path());

            let found = fetcher.fetch(7, "https://example.com/watch?v=ok").unwrap();
            assert_eq!(found, Some(metadata(125.0)));
            assert!(fetcher.scratch_dir().join("00007.info.json").is_file());
        }

        #[test]
        fn failed_download_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let mut fetcher = fake_fetcher(dir.path());

            let found = fetcher.fetch(1, "https://example.com/missing").unwrap();
            assert_eq!(found, None);
        }

        /// Builds a fetcher whose downloader records its arguments, one per line.
        fn recording_fetcher(dir: &Path, extra_args: &[&str]) -> (DownloaderFetcher, PathBuf) {
            let argv = dir.join("argv.txt");
            let script = dir.join("record-args.sh");
            fs::write(
                &script,
                format!(
                    "for arg in \"$@\"; do printf '%s\\n' \"$arg\" >> '{}'; done\n",
                    argv.display()
                ),
            )
            .unwrap();
            let mut args = vec![script.display().to_string()];
            args.extend(extra_args.iter().map(ToString::to_string));
            let fetcher = DownloaderFetcher::new(&DownloaderConfig {
                program: "sh".to_string(),
                args,
                scratch_prefix: "wt_test".to_string(),
            })
            .unwrap();
            (fetcher, argv)
        }

        fn recorded_args(argv: &Path) -> Vec<String> {
            fs::read_to_string(argv)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[test]
        fn downloader_is_asked_for_metadata_only() {
            let dir = tempfile::tempdir().unwrap();
            let (mut fetcher, argv) = recording_fetcher(dir.path(), &["--cookies", "cookies.txt"]);

            let found = fetcher.fetch(7, "https://example.com/watch?v=ok").unwrap();

            assert_eq!(found, None);
            let prefix = fetcher.scratch_dir().join("00007").display().to_string();
            assert_eq!(
                recorded_args(&argv),
                [
                    "--cookies",
                    "cookies.txt",
                    "-o",
                    prefix.as_str(),
                    "--skip-download",
                    "--write-info-json",
                    "-i",
                    "--",
                    "https://example.com/watch?v=ok",
                ]
            );
        }

        #[test]
        fn url_starting_with_dash_is_not_an_option() {
            let dir = tempfile::tempdir().unwrap();
            let (mut fetcher, argv) = recording_fetcher(dir.path(), &[]);

            fetcher.fetch(1, "--exec=touch hacked").unwrap();

            let args = recorded_args(&argv);
            let url_at = args.iter().position(|a| a == "--exec=touch hacked").unwrap();
            assert_eq!(url_at, args.len() - 1);
            assert_eq!(args[url_at - 1], "--");
        }

        #[test]
        fn malformed_sidecar_propagates() {
            let dir = tempfile::tempdir().unwrap();
            let mut fetcher = fake_fetcher(dir.path());

            let err = fetcher.fetch(1, "https://example.com/broken").unwrap_err();
            assert!(matches!(err, Error::Json { .. }));
        }
    }
}
