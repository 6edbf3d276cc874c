use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Root directory for per-user download folders
/// Read from DOWNLOADS_DIR environment variable
/// Supports tilde (~) expansion for home directory
/// Default: downloads (relative to the working directory)
pub static DOWNLOADS_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("DOWNLOADS_DIR").unwrap_or_else(|_| "downloads".to_string());
    shellexpand::tilde(&raw).into_owned()
});

/// Shared temporary directory, reserved for processing steps
/// Read from TEMP_DIR environment variable
/// Default: temp
pub static TEMP_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("TEMP_DIR").unwrap_or_else(|_| "temp".to_string());
    shellexpand::tilde(&raw).into_owned()
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: muzka.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "muzka.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Download configuration
pub mod download {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Maximum downloaded file size in megabytes.
    /// Telegram Bot API rejects uploads above 50 MB, so anything larger
    /// than this is deleted instead of sent.
    /// Override with MAX_DOWNLOAD_SIZE_MB.
    pub static MAX_DOWNLOAD_SIZE_MB: Lazy<u64> = Lazy::new(|| {
        env::var("MAX_DOWNLOAD_SIZE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50)
    });

    /// Timeout for a single yt-dlp download run (in seconds).
    /// Override with DOWNLOAD_TIMEOUT_SECONDS.
    pub static DOWNLOAD_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("DOWNLOAD_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300)
    });

    /// Extensions a finished download may carry
    pub const SUPPORTED_FORMATS: &[&str] = &["mp3", "wav", "flac", "m4a"];

    /// webm appears transiently before ffmpeg transcodes it; accept it too
    pub const TRANSIENT_FORMATS: &[&str] = &["webm"];

    /// Download timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Search configuration
pub mod search {
    use super::Duration;

    /// Default number of tracks shown for a query
    pub const DEFAULT_LIMIT: usize = 5;

    /// Timeout for a single metadata-only yt-dlp run (in seconds)
    pub const METADATA_TIMEOUT_SECS: u64 = 60;

    /// Metadata timeout duration
    pub fn metadata_timeout() -> Duration {
        Duration::from_secs(METADATA_TIMEOUT_SECS)
    }
}

/// Worker pool configuration
pub mod pool {
    use once_cell::sync::Lazy;
    use std::env;

    /// Maximum number of concurrent extractor downloads across all users.
    /// Override with MAX_CONCURRENT_DOWNLOADS.
    pub static MAX_CONCURRENT_DOWNLOADS: Lazy<usize> = Lazy::new(|| {
        env::var("MAX_CONCURRENT_DOWNLOADS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram API requests (in seconds)
    /// Generous to cover audio uploads close to the size limit
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
