//! Shared test helpers: an in-memory stub extractor.
//!
//! The stub is scripted per test: `extract` pops pre-seeded responses in
//! order, `download_audio` writes (or refuses to write) files into the
//! target directory. No network, no yt-dlp binary.

#![allow(dead_code)] // Each integration test binary uses its own subset

use async_trait::async_trait;
use muzka::core::error::AppError;
use muzka::download::error::DownloadError;
use muzka::extractor::{DownloadOptions, Extractor, RawEntry};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the stub does when `download_audio` is called.
pub enum DownloadBehavior {
    /// Write the given (name, size) files into the target directory
    ProduceFiles(Vec<(String, usize)>),
    /// Succeed without writing anything
    ProduceNothing,
    /// Write the given files, then fail (broken partial run)
    FailAfterWriting(Vec<(String, usize)>),
    /// Fail outright
    Fail(String),
}

/// Scripted extractor; each `extract` call consumes the next response.
pub struct StubExtractor {
    responses: Mutex<VecDeque<Result<Vec<RawEntry>, String>>>,
    behavior: DownloadBehavior,
    extract_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl StubExtractor {
    pub fn new(responses: Vec<Result<Vec<RawEntry>, String>>, behavior: DownloadBehavior) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            behavior,
            extract_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_responses(responses: Vec<Result<Vec<RawEntry>, String>>) -> Self {
        Self::new(responses, DownloadBehavior::ProduceNothing)
    }

    pub fn with_download(behavior: DownloadBehavior) -> Self {
        Self::new(Vec::new(), behavior)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    fn name(&self) -> &str {
        "stub"
    }

    async fn extract(&self, _query: &str) -> Result<Vec<RawEntry>, AppError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(entries)) => Ok(entries),
            Some(Err(msg)) => Err(AppError::Download(DownloadError::Extractor(msg))),
            // Script exhausted: behave like a search with no matches
            None => Ok(Vec::new()),
        }
    }

    async fn download_audio(
        &self,
        _url: &str,
        target_dir: &Path,
        _opts: &DownloadOptions,
    ) -> Result<(), AppError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);

        let write_all = |files: &[(String, usize)]| -> std::io::Result<()> {
            for (name, size) in files {
                fs::write(target_dir.join(name), vec![0u8; *size])?;
            }
            Ok(())
        };

        match &self.behavior {
            DownloadBehavior::ProduceFiles(files) => {
                write_all(files)?;
                Ok(())
            }
            DownloadBehavior::ProduceNothing => Ok(()),
            DownloadBehavior::FailAfterWriting(files) => {
                write_all(files)?;
                Err(AppError::Download(DownloadError::Extractor(
                    "simulated failure after partial write".to_string(),
                )))
            }
            DownloadBehavior::Fail(msg) => Err(AppError::Download(DownloadError::Extractor(msg.clone()))),
        }
    }
}

/// Entry with a title and canonical URL, everything else defaulted.
pub fn entry(title: &str, url: &str) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        uploader: Some("Artist".to_string()),
        duration: Some(180.0),
        webpage_url: Some(url.to_string()),
        id: Some("id1".to_string()),
        thumbnail: Some("https://img.example/1.jpg".to_string()),
        availability: Some("public".to_string()),
    }
}

/// N distinct YouTube entries.
pub fn entries(n: usize) -> Vec<RawEntry> {
    (0..n)
        .map(|i| {
            entry(
                &format!("Track {}", i),
                &format!("https://www.youtube.com/watch?v=vid{}", i),
            )
        })
        .collect()
}
