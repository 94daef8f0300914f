//! JSON-array log of files written from assistant output.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::models::PasteLogEntry;
use crate::{Error, Result};

use super::{data_dir, write_json};

/// File name of the paste log inside the data directory.
pub const PASTE_LOG_FILE: &str = "paste.log.json";

/// Reads and appends paste log entries.
#[derive(Debug, Clone)]
pub struct PasteLog {
    path: PathBuf,
}

impl PasteLog {
    /// Creates a log rooted at a project directory.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir(root).join(PASTE_LOG_FILE),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once the log file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads every entry in file order. A missing file is an empty log.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of
    /// entries.
    pub fn load(&self) -> Result<Vec<PasteLogEntry>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "read_paste_log".to_string(),
                    cause: format!("{}: {e}", self.path.display()),
                });
            },
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| Error::OperationFailed {
            operation: "parse_paste_log".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })
    }

    /// Appends an entry and returns its queue index.
    ///
    /// An entry without a queue index gets its position in the log. A log
    /// that cannot be parsed is replaced by a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    #[instrument(skip(self, entry), fields(path = %self.path.display(), file = %entry.file))]
    pub fn append(&self, mut entry: PasteLogEntry) -> Result<u64> {
        let mut entries = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "paste log unreadable, starting a new one");
            Vec::new()
        });
        let index = *entry
            .queue_index
            .get_or_insert(u64::try_from(entries.len()).unwrap_or(u64::MAX));
        entries.push(entry);
        write_json(&self.path, &entries, "write_paste_log")?;
        info!(index, "paste logged");
        Ok(index)
    }

    /// Returns entries newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be loaded.
    pub fn history(&self) -> Result<Vec<PasteLogEntry>> {
        let mut entries = self.load()?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        debug!(entries = entries.len(), "paste history loaded");
        Ok(entries)
    }
}

/// Writes assistant output to `file` (relative to `root`) and logs the write.
///
/// An existing file is only replaced when `overwrite` is set. A refused or
/// failed write is still logged, with its error, before the error is
/// returned.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the file exists and `overwrite` is
/// not set, or an error if the file or the log cannot be written.
#[instrument(skip(content, prompt), fields(bytes = content.len()))]
pub fn paste_output(
    root: &Path,
    file: &str,
    content: &str,
    prompt: &str,
    overwrite: bool,
) -> Result<PasteLogEntry> {
    let log = PasteLog::new(root);
    let dest = root.join(file);
    let existed = dest.exists();
    let bytes = u64::try_from(content.len()).unwrap_or(u64::MAX);

    if existed && !overwrite {
        let err = Error::InvalidInput(format!("{file} already exists"));
        log.append(PasteLogEntry::new(file, 0, prompt).with_error(err.to_string()))?;
        return Err(err);
    }

    let written = dest
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(&dest, content));
    if let Err(e) = written {
        let err = Error::OperationFailed {
            operation: "write_output".to_string(),
            cause: format!("{}: {e}", dest.display()),
        };
        log.append(
            PasteLogEntry::new(file, 0, prompt)
                .with_overwrite(existed)
                .with_error(err.to_string()),
        )?;
        return Err(err);
    }

    let mut entry = PasteLogEntry::new(file, bytes, prompt).with_overwrite(existed);
    entry.queue_index = Some(log.append(entry.clone())?);
    Ok(entry)
}
