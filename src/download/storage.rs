//! Per-user scratch storage for downloaded files.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Manages per-user scratch directories under a common downloads root.
///
/// Each user gets `<root>/<user_id>/`, holding at most the files of that
/// user's in-flight or most recent download. Directories of different users
/// are independent. Concurrent requests for the *same* user are not
/// serialized here; their directory operations may interleave (known gap).
#[derive(Debug, Clone)]
pub struct UserStorage {
    root: PathBuf,
}

impl UserStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for one user's files. Not created by this call.
    pub fn user_dir(&self, user_id: i64) -> PathBuf {
        self.root.join(user_id.to_string())
    }

    /// Creates the user's directory if absent. Idempotent.
    pub fn ensure_user_dir(&self, user_id: i64) -> io::Result<PathBuf> {
        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Deletes every file in the user's directory, if it exists.
    ///
    /// Subdirectories are left alone. Each failed deletion is logged and
    /// skipped independently, so one stuck file does not keep the rest
    /// of the directory from being cleared.
    pub fn cleanup_user_files(&self, user_id: i64) {
        let dir = self.user_dir(user_id);
        if !dir.exists() {
            return;
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Failed to read user dir {}: {}", dir.display(), e);
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                log::error!("Failed to delete file {}: {}", path.display(), e);
            } else {
                log::debug!("Deleted {}", path.display());
            }
        }
    }
}
