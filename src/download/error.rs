use thiserror::Error;

/// Structured error type for download operations.
///
/// Categorized variants instead of a bare string so the Telegram layer can
/// choose the right user-facing message per failure class.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Extractor run failed: spawn failure, bad exit code, unusable output
    #[error("{0}")]
    Extractor(String),

    /// Extractor run exceeded its timeout and was killed
    #[error("extractor timed out after {0}s")]
    Timeout(u64),

    /// The finished file exceeded the configured limit and was deleted
    #[error("downloaded file is too large: {size_mb} MB (limit {limit_mb} MB)")]
    TooLarge { size_mb: u64, limit_mb: u64 },
}

impl DownloadError {
    /// Short failure class for log lines
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Extractor(_) => "extractor",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::TooLarge { .. } => "too_large",
        }
    }
}
