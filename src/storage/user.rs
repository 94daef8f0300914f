//! Per-project user profile.

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::Result;
use crate::models::{Difficulty, UserProfile};

use super::{data_dir, write_json};

/// File name of the user profile inside the data directory.
pub const USER_FILE: &str = "user.json";

/// Reads and updates the user's skill level.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Creates a store rooted at a project directory.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir(root).join(USER_FILE),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the profile. A missing or unreadable file yields the default.
    #[must_use]
    pub fn load(&self) -> UserProfile {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    debug!(error = %e, "user profile unreadable, using defaults");
                    None
                },
            })
            .unwrap_or_default()
    }

    /// Returns the current level.
    #[must_use]
    pub fn level(&self) -> Difficulty {
        self.load().level
    }

    /// Sets the current level, keeping the counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn set_level(&self, level: Difficulty) -> Result<()> {
        let mut profile = self.load();
        profile.level = level;
        write_json(&self.path, &profile, "write_user_profile")?;
        info!(level = %level, "skill level set");
        Ok(())
    }

    /// Increments the count for `level` and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written.
    pub fn increment(&self, level: Difficulty) -> Result<u64> {
        let mut profile = self.load();
        let count = profile.counts.increment(level);
        write_json(&self.path, &profile, "write_user_profile")?;
        Ok(count)
    }
}
