//! External media extractor abstraction.
//!
//! Provides the `Extractor` trait for the search/download engine and the
//! production `YtDlpExtractor` backend. The engine only ever talks to the
//! trait, so tests can substitute an in-memory stub and the yt-dlp binary
//! stays an opaque collaborator.

pub mod ytdlp;

use crate::core::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use ytdlp::YtDlpExtractor;

/// One entry from a metadata-only extraction run.
///
/// Mirrors the subset of yt-dlp's JSON output the bot consumes. Every field
/// is optional: search results routinely omit some of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub webpage_url: Option<String>,
    pub thumbnail: Option<String>,
    pub availability: Option<String>,
}

impl RawEntry {
    /// Entries the extractor marks unavailable are dropped from search results.
    pub fn is_unavailable(&self) -> bool {
        self.availability.as_deref() == Some("unavailable")
    }
}

/// Options for a single audio download run.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Stream selector, best audio-only stream first
    pub format: String,
    /// Target container after extraction (e.g. "mp3")
    pub audio_format: String,
    /// Audio quality target (e.g. "192K")
    pub audio_quality: String,
    /// Whole-process timeout; the child is killed on expiry
    pub timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: "bestaudio[ext=m4a]/bestaudio/best".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Opaque media extractor: resolves search expressions to metadata entries
/// and materializes audio files on disk.
///
/// `extract` must never trigger a media download; `download_audio` writes
/// whatever files the backend chooses into `target_dir` and reports nothing
/// back, so callers inspect the directory afterwards.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable backend name for logs (e.g. "yt-dlp")
    fn name(&self) -> &str;

    /// Metadata-only extraction for a search expression or URL.
    async fn extract(&self, query: &str) -> Result<Vec<RawEntry>, AppError>;

    /// Download the best audio stream for `url` into `target_dir`.
    async fn download_audio(&self, url: &str, target_dir: &Path, opts: &DownloadOptions) -> Result<(), AppError>;
}
