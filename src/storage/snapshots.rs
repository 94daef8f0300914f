//! Content-addressed output snapshots.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::services::ContentHasher;
use crate::{Error, Result};

use super::data_dir;

/// Directory name for snapshots inside the data directory.
pub const SNAPSHOTS_DIR: &str = "snapshots";

/// Builds a snapshot file name: `<timestamp>-<hash>.txt`.
///
/// The timestamp is ISO 8601 in UTC with millisecond precision, with `:` and
/// `.` replaced by `-` so the name is portable.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use uado::storage::snapshot_file_name;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
/// assert_eq!(
///     snapshot_file_name("abc123", at),
///     "2024-05-01T12-30-45-000Z-abc123.txt"
/// );
/// ```
#[must_use]
pub fn snapshot_file_name(hash: &str, at: DateTime<Utc>) -> String {
    let timestamp = at
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");
    format!("{timestamp}-{hash}.txt")
}

/// Stores generated output under content-addressed names.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at a project directory.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir(root).join(SNAPSHOTS_DIR),
        }
    }

    /// Returns the snapshot directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `content` and returns the snapshot path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, content: &str) -> Result<PathBuf> {
        self.save_at(content, Utc::now())
    }

    /// Writes `content` using an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    #[instrument(skip(self, content), fields(dir = %self.dir.display(), bytes = content.len()))]
    pub fn save_at(&self, content: &str, at: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::OperationFailed {
            operation: "create_snapshot_dir".to_string(),
            cause: format!("{}: {e}", self.dir.display()),
        })?;
        let hash = ContentHasher::hash_text(content);
        let path = self.dir.join(snapshot_file_name(&hash, at));
        std::fs::write(&path, content).map_err(|e| Error::OperationFailed {
            operation: "write_snapshot".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        info!(path = %path.display(), "snapshot saved");
        Ok(path)
    }

    /// Lists snapshot files in name order. A missing directory is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "list_snapshots".to_string(),
                    cause: format!("{}: {e}", self.dir.display()),
                });
            },
        };

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Finds the first snapshot (by name order) whose name contains `hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn find(&self, hash: &str) -> Result<Option<PathBuf>> {
        if hash.is_empty() {
            return Ok(None);
        }
        Ok(self.list()?.into_iter().find(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().contains(hash))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_keeps_milliseconds() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            snapshot_file_name("h", at),
            "2023-11-14T22-13-20-123Z-h.txt"
        );
    }

    #[test]
    fn test_save_is_content_addressed() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let path = store.save_at("export const x = 1;\n", at).unwrap();

        let hash = ContentHasher::hash_text("export const x = 1;\n");
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("2024-01-02T03-04-05-000Z-{hash}.txt")
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "export const x = 1;\n");
        assert_eq!(store.find(&hash).unwrap(), Some(path));
    }

    #[test]
    fn test_find_without_directory() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert_eq!(store.find("abc").unwrap(), None);
        assert_eq!(store.find("").unwrap(), None);
    }
}
