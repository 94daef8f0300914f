//! User skill level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Self-reported skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// New to the stack.
    #[default]
    Beginner,
    /// Comfortable with the basics.
    Intermediate,
    /// Experienced.
    Advanced,
}

impl Difficulty {
    /// All levels, easiest first.
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| {
                Error::InvalidInput(
                    "difficulty must be beginner, intermediate, or advanced".to_string(),
                )
            })
    }
}

/// How many patterns were logged at each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCounts {
    /// Beginner count.
    pub beginner: u64,
    /// Intermediate count.
    pub intermediate: u64,
    /// Advanced count.
    pub advanced: u64,
}

impl DifficultyCounts {
    /// Returns the count for `level`.
    #[must_use]
    pub const fn get(&self, level: Difficulty) -> u64 {
        match level {
            Difficulty::Beginner => self.beginner,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }

    /// Increments the count for `level` and returns the new value.
    pub const fn increment(&mut self, level: Difficulty) -> u64 {
        let slot = match level {
            Difficulty::Beginner => &mut self.beginner,
            Difficulty::Intermediate => &mut self.intermediate,
            Difficulty::Advanced => &mut self.advanced,
        };
        *slot = slot.saturating_add(1);
        *slot
    }
}

/// Persisted per-project user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Current skill level.
    #[serde(default)]
    pub level: Difficulty,
    /// Patterns logged per level.
    #[serde(default)]
    pub counts: DifficultyCounts,
}
