//! Audio download into per-user scratch directories.
//!
//! The downloader hands a URL to the extractor, then inspects the user's
//! directory for the produced file, enforces the size limit and clears the
//! directory on every failure path so a retry starts clean.

use crate::core::config;
use crate::core::error::AppError;
use crate::download::error::DownloadError;
use crate::download::storage::UserStorage;
use crate::extractor::{DownloadOptions, Extractor};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// Sentinel substring marking placeholder URLs from non-functional
/// environments. Such URLs never reach the extractor.
const DEMO_URL_MARKER: &str = "demo";

/// Downloader tuning passed in at construction.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Files above this limit are deleted instead of returned
    pub max_size_mb: u64,
    /// Options forwarded to the extractor run
    pub options: DownloadOptions,
    /// Concurrent extractor downloads across all users
    pub max_concurrent: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: *config::download::MAX_DOWNLOAD_SIZE_MB,
            options: DownloadOptions {
                timeout: config::download::timeout(),
                ..DownloadOptions::default()
            },
            max_concurrent: *config::pool::MAX_CONCURRENT_DOWNLOADS,
        }
    }
}

/// A finished download: one file inside the user's scratch directory.
#[derive(Debug, Clone)]
pub struct DownloadedTrack {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Resolves track URLs to local audio files, one scratch directory per user.
pub struct TrackDownloader {
    extractor: Arc<dyn Extractor>,
    storage: UserStorage,
    config: DownloadConfig,
    permits: Semaphore,
}

impl TrackDownloader {
    pub fn new(extractor: Arc<dyn Extractor>, storage: UserStorage, config: DownloadConfig) -> Self {
        let permits = Semaphore::new(config.max_concurrent.max(1));
        Self {
            extractor,
            storage,
            config,
            permits,
        }
    }

    /// Resolves `url` to an audio file in the user's scratch directory.
    ///
    /// `Ok(None)` covers two quiet outcomes the caller must distinguish
    /// from an error: a demo-sentinel URL (rejected before the extractor
    /// runs at all) and an extractor run that produced no audio file.
    /// An oversize file is deleted on the spot and reported as
    /// `DownloadError::TooLarge`. Every error path clears the user's
    /// directory best-effort before propagating; cleanup problems are
    /// logged and never replace the original error.
    pub async fn download(&self, url: &str, user_id: i64) -> Result<Option<DownloadedTrack>, AppError> {
        if url.to_lowercase().contains(DEMO_URL_MARKER) {
            log::warn!("Demo URL detected, skipping download: {}", url);
            return Ok(None);
        }

        match self.try_download(url, user_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::error!("Download failed for user {} ({}): {}", user_id, url, e);
                self.storage.cleanup_user_files(user_id);
                Err(e)
            }
        }
    }

    async fn try_download(&self, url: &str, user_id: i64) -> Result<Option<DownloadedTrack>, AppError> {
        // yt-dlp получает только синтаксически корректные ссылки
        let parsed = Url::parse(url)?;

        let user_dir = self.storage.ensure_user_dir(user_id)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AppError::Download(DownloadError::Extractor("download pool closed".to_string())))?;

        self.extractor
            .download_audio(parsed.as_str(), &user_dir, &self.config.options)
            .await?;

        // Первый файл с подходящим расширением и есть результат
        let Some(path) = find_audio_file(&user_dir)? else {
            log::warn!("Extractor produced no audio file in {}", user_dir.display());
            return Ok(None);
        };

        let size_bytes = fs::metadata(&path)?.len();
        let limit_bytes = self.config.max_size_mb * 1024 * 1024;
        if size_bytes > limit_bytes {
            log::warn!(
                "File {} is {} bytes, over the {} MB limit; deleting",
                path.display(),
                size_bytes,
                self.config.max_size_mb
            );
            if let Err(e) = fs::remove_file(&path) {
                log::error!("Failed to delete oversize file {}: {}", path.display(), e);
            }
            return Err(AppError::Download(DownloadError::TooLarge {
                size_mb: size_bytes / (1024 * 1024),
                limit_mb: self.config.max_size_mb,
            }));
        }

        log::info!(
            "Downloaded {} ({} bytes) for user {}",
            path.display(),
            size_bytes,
            user_id
        );
        Ok(Some(DownloadedTrack { path, size_bytes }))
    }
}

/// First file in the directory carrying a supported audio extension.
fn find_audio_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase) else {
            continue;
        };
        if config::download::SUPPORTED_FORMATS.contains(&ext.as_str())
            || config::download::TRANSIENT_FORMATS.contains(&ext.as_str())
        {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
