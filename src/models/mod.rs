//! Data models for uado.
//!
//! Signal and event types exchanged between the cooldown engine and its
//! collaborators, plus the records kept on disk: pattern examples, the
//! paste log, and the user's skill level.

mod events;
mod paste;
mod pattern;
mod user;

pub use events::{ChurnKind, CooldownEvent, EndReason, Signal};
pub use paste::PasteLogEntry;
pub use pattern::{DEFAULT_TAG, PatternCollection, PatternEntry};
pub use user::{Difficulty, DifficultyCounts, UserProfile};
