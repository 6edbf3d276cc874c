//! YtDlpExtractor — production `Extractor` backed by the yt-dlp binary.
//!
//! Metadata runs go through `--dump-json --skip-download` (one JSON object
//! per stdout line). Download runs extract the best audio-only stream into
//! the target directory; transport-level retries and socket timeouts are
//! yt-dlp's own knobs, passed on the command line, not reimplemented here.

use crate::core::config;
use crate::core::error::AppError;
use crate::download::error::DownloadError;
use crate::extractor::{DownloadOptions, Extractor, RawEntry};
use async_trait::async_trait;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Wait for a child process with a timeout. Kills the child on timeout.
fn wait_with_output_timeout(mut child: Child, limit: Duration) -> Result<std::process::Output, AppError> {
    let deadline = std::time::Instant::now() + limit;

    // Poll with try_wait until the process exits or we time out
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => {
                return child.wait_with_output().map_err(AppError::Io);
            }
            Ok(None) => {
                if std::time::Instant::now() >= deadline {
                    log::error!("yt-dlp process timed out after {}s, killing", limit.as_secs());
                    let _ = child.kill();
                    let _ = child.wait(); // Reap the zombie
                    return Err(AppError::Download(DownloadError::Timeout(limit.as_secs())));
                }
                std::thread::sleep(Duration::from_millis(500));
            }
            Err(e) => return Err(AppError::Io(e)),
        }
    }
}

/// Extractor powered by the yt-dlp binary.
pub struct YtDlpExtractor {
    bin: String,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpExtractor {
    /// Uses the binary path from `config::YTDL_BIN`.
    pub fn new() -> Self {
        Self {
            bin: config::YTDL_BIN.clone(),
        }
    }

    /// Uses an explicit binary path (tests, non-PATH installs).
    pub fn with_binary(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Hosting-friendly flags for metadata-only runs: short socket timeout,
    /// a few transport retries, tolerance for broken playlist entries.
    fn metadata_args(query: &str) -> Vec<String> {
        [
            "--dump-json",
            "--skip-download",
            "--quiet",
            "--no-warnings",
            "--socket-timeout",
            "30",
            "--retries",
            "3",
            "--fragment-retries",
            "3",
            "--skip-unavailable-fragments",
            "--extractor-retries",
            "2",
            "--ignore-errors",
            "--no-check-certificate",
            "--prefer-insecure",
            "--geo-bypass",
            query,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract(&self, query: &str) -> Result<Vec<RawEntry>, AppError> {
        log::debug!("yt-dlp metadata run: {}", query);

        let args = Self::metadata_args(query);
        let output = timeout(
            config::search::metadata_timeout(),
            TokioCommand::new(&self.bin).args(&args).stdin(Stdio::null()).output(),
        )
        .await
        .map_err(|_| AppError::Download(DownloadError::Timeout(config::search::METADATA_TIMEOUT_SECS)))?
        .map_err(|e| {
            AppError::Download(DownloadError::Extractor(format!(
                "failed to run {}: {}",
                self.bin, e
            )))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut entries = Vec::new();
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("Skipping unparsable yt-dlp entry: {}", e),
            }
        }

        // --ignore-errors keeps partial results usable; only an empty run
        // with a bad exit code counts as a failed variant.
        if entries.is_empty() && !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Download(DownloadError::Extractor(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no stderr")
            ))));
        }

        Ok(entries)
    }

    async fn download_audio(&self, url: &str, target_dir: &Path, opts: &DownloadOptions) -> Result<(), AppError> {
        let bin = self.bin.clone();
        let output_template = target_dir.join("%(title)s.%(ext)s").to_string_lossy().into_owned();
        let url = url.to_string();
        let opts = opts.clone();

        log::info!("yt-dlp audio download: {}", url);

        // The child-wait loop blocks, so it runs on the blocking pool and
        // the runtime stays free for other chats.
        let output = tokio::task::spawn_blocking(move || {
            let args = [
                "-o",
                output_template.as_str(),
                "-f",
                opts.format.as_str(),
                "--extract-audio",
                "--audio-format",
                opts.audio_format.as_str(),
                "--audio-quality",
                opts.audio_quality.as_str(),
                "--restrict-filenames",
                "--no-playlist",
                "--no-check-certificate",
                "--prefer-insecure",
                "--geo-bypass",
                "--ignore-errors",
                "--quiet",
                "--no-warnings",
                "--socket-timeout",
                "60",
                "--retries",
                "5",
                "--fragment-retries",
                "5",
                "--skip-unavailable-fragments",
                url.as_str(),
            ];

            let child = Command::new(&bin)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| {
                    AppError::Download(DownloadError::Extractor(format!("failed to spawn {}: {}", bin, e)))
                })?;

            wait_with_output_timeout(child, opts.timeout)
        })
        .await
        .map_err(|e| AppError::Download(DownloadError::Extractor(format!("download task failed: {}", e))))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Download(DownloadError::Extractor(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no stderr")
            ))));
        }

        Ok(())
    }
}

/// Логирует версию yt-dlp при старте бота.
///
/// Отсутствие бинарника — это ошибка конфигурации, о которой лучше узнать
/// сразу, а не на первом запросе пользователя.
pub async fn print_ytdlp_version() -> Result<(), AppError> {
    let ytdl_bin = &*config::YTDL_BIN;

    let version_output = TokioCommand::new(ytdl_bin)
        .arg("--version")
        .output()
        .await
        .map_err(|e| AppError::Download(DownloadError::Extractor(format!("Failed to get yt-dlp version: {}", e))))?;

    let version = String::from_utf8_lossy(&version_output.stdout).trim().to_string();

    if version.is_empty() {
        return Err(AppError::Download(DownloadError::Extractor(
            "yt-dlp is not installed or --version produced no output".to_string(),
        )));
    }

    log::info!("yt-dlp version: {}", version);

    Ok(())
}
