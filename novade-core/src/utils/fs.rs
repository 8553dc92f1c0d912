//! Filesystem helpers returning [`CoreError`].

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Creates `path` (and any missing parents) unless it already is a directory.
///
/// # Errors
///
/// [`CoreError::Filesystem`] if the path is occupied by something that is not
/// a directory, or if creation fails.
///
/// # Examples
///
/// ```no_run
/// # use novade_core::utils::fs::ensure_dir_exists;
/// let dir = tempfile::tempdir().unwrap();
/// let logs = dir.path().join("logs");
/// ensure_dir_exists(&logs).unwrap();
/// assert!(logs.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(CoreError::Filesystem {
            message: "Path exists but is not a directory".to_string(),
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "Path exists but is not a directory"),
        });
    }
    fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to create directory".to_string(),
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "Created directory");
    Ok(())
}
