//! File persistence for pattern examples, output snapshots, the paste log
//! and the user profile.
//!
//! Everything lives under a project-local data directory (`.uado/`).
//! Persistence is outside the cooldown/orchestration core and carries no
//! cross-process locking.

mod paste_log;
mod patterns;
mod snapshots;
mod user;

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::Difficulty;
use crate::{Error, Result};

pub use paste_log::{PASTE_LOG_FILE, PasteLog, paste_output};
pub use patterns::{PATTERNS_FILE, PatternStore};
pub use snapshots::{SNAPSHOTS_DIR, SnapshotStore, snapshot_file_name};
pub use user::{USER_FILE, UserStore};

/// Name of the project-local data directory.
pub const DATA_DIR: &str = ".uado";

/// Returns the data directory for a project root.
#[must_use]
pub fn data_dir(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(DATA_DIR)
}

/// What a project's data directory currently holds.
///
/// Counts are `None` when the backing file does not exist. A file that
/// exists but cannot be read counts as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStatus {
    /// Stored pattern examples.
    pub patterns: Option<usize>,
    /// Paste log entries.
    pub pastes: Option<usize>,
    /// Saved snapshots.
    pub snapshots: usize,
    /// Current skill level.
    pub level: Difficulty,
}

impl DataStatus {
    /// Inspects the data directory under `root`.
    #[must_use]
    pub fn collect(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let patterns = PatternStore::new(root);
        let pastes = PasteLog::new(root);
        Self {
            patterns: patterns.path().is_file().then(|| {
                patterns.load().map(|c| c.len()).unwrap_or_else(|e| {
                    warn!(error = %e, "pattern file unreadable");
                    0
                })
            }),
            pastes: pastes.exists().then(|| {
                pastes.load().map(|log| log.len()).unwrap_or_else(|e| {
                    warn!(error = %e, "paste log unreadable");
                    0
                })
            }),
            snapshots: SnapshotStore::new(root).list().map_or(0, |paths| paths.len()),
            level: UserStore::new(root).level(),
        }
    }
}

/// Writes `value` as pretty JSON, creating parent directories.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, operation: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_data_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }
    let json =
        serde_json::to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{}: {e}", path.display()),
    })
}
