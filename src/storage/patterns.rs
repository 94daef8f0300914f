//! JSON-file pattern collection.
//!
//! Patterns live in `<root>/.uado/patterns.json`, either as a flat array
//! or grouped by tag. Writes always use the grouped shape.
//!
//! Concurrent writers are not coordinated: two processes logging at the same
//! time can lose one entry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::models::{PatternCollection, PatternEntry};
use crate::services::ContentHasher;
use crate::{Error, Result};

use super::{data_dir, write_json};

/// File name of the pattern collection inside the data directory.
pub const PATTERNS_FILE: &str = "patterns.json";

/// Reads and appends stored pattern examples.
#[derive(Debug, Clone)]
pub struct PatternStore {
    path: PathBuf,
}

impl PatternStore {
    /// Creates a store rooted at a project directory.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::at_path(data_dir(root).join(PATTERNS_FILE))
    }

    /// Creates a store backed by an explicit file.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the collection. A missing file is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<PatternCollection> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no pattern file yet");
                return Ok(PatternCollection::default());
            },
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "read_patterns".to_string(),
                    cause: format!("{}: {e}", self.path.display()),
                });
            },
        };

        if raw.trim().is_empty() {
            return Ok(PatternCollection::default());
        }

        serde_json::from_str(&raw).map_err(|e| Error::OperationFailed {
            operation: "parse_patterns".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })
    }

    /// Loads every entry, flattened.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be loaded.
    pub fn entries(&self) -> Result<Vec<PatternEntry>> {
        Ok(self.load()?.into_entries())
    }

    /// Appends an entry unless one with the same prompt hash already exists.
    ///
    /// The entry's `hash` is stamped with the raw SHA-256 of its prompt.
    /// Returns `false` when the entry was a duplicate and nothing was written.
    /// Group order in the file is kept; a new tag is appended last.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be loaded or written.
    #[instrument(skip(self, entry), fields(path = %self.path.display(), tag = entry.tag_or_default()))]
    pub fn log_pattern(&self, mut entry: PatternEntry) -> Result<bool> {
        let hash = ContentHasher::hash_raw(&entry.prompt);
        let collection = self.load()?;
        if collection.contains_prompt(&entry.prompt) {
            debug!(hash = %hash, "pattern already logged");
            return Ok(false);
        }

        entry.hash = Some(hash);
        let mut groups = collection.into_grouped();
        groups
            .entry(entry.tag_or_default().to_string())
            .or_default()
            .push(entry);
        write_json(&self.path, &groups, "write_patterns")?;
        info!("pattern logged");
        Ok(true)
    }
}
