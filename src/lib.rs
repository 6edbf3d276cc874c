//! Muzka - Telegram bot for searching and downloading music
//!
//! This library provides the core functionality for the Muzka bot:
//! track search across YouTube and SoundCloud, audio download through
//! yt-dlp, per-user scratch storage, and the Telegram handler tree.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, and small helpers
//! - `extractor`: the external extractor seam (trait + yt-dlp backend)
//! - `download`: track search, audio download, and per-user storage
//! - `telegram`: Telegram bot integration and handlers

pub mod core;
pub mod download;
pub mod extractor;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::download::{
    DownloadConfig, DownloadError, SearchConfig, Track, TrackDownloader, TrackSearcher, UserStorage,
};
pub use crate::extractor::{Extractor, YtDlpExtractor};
