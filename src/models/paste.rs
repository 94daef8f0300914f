//! Records of assistant output written into the project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One file written from assistant output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteLogEntry {
    /// When the file was written.
    pub timestamp: DateTime<Utc>,
    /// Path of the written file, relative to the project root.
    pub file: String,
    /// Number of bytes written.
    pub bytes_written: u64,
    /// The prompt that produced the content.
    pub prompt: String,
    /// Position in the paste log, stamped on append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_index: Option<u64>,
    /// Whether an existing file was replaced.
    #[serde(default)]
    pub was_overwrite: bool,
    /// Failure message when the write did not happen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PasteLogEntry {
    /// Creates a successful write record stamped now.
    #[must_use]
    pub fn new(file: impl Into<String>, bytes_written: u64, prompt: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            file: file.into(),
            bytes_written,
            prompt: prompt.into(),
            queue_index: None,
            was_overwrite: false,
            error: None,
        }
    }

    /// Builder method to set the timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder method to mark an overwrite.
    #[must_use]
    pub const fn with_overwrite(mut self, was_overwrite: bool) -> Self {
        self.was_overwrite = was_overwrite;
        self
    }

    /// Builder method to record a failure.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Returns the prompt with whitespace runs collapsed, cut to `max_chars`.
    #[must_use]
    pub fn prompt_preview(&self, max_chars: usize) -> String {
        self.prompt
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(max_chars)
            .collect()
    }
}
