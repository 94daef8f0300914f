//! Signal and cooldown event types.
//!
//! Signals flow *into* the cooldown engine from churn sources; cooldown
//! events flow *out* of it to listeners such as the prompt orchestrator.

use std::fmt;

/// What kind of churn a source observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChurnKind {
    /// A watched project file changed.
    FileChanged,
    /// The language server started re-indexing.
    LspBusy,
}

impl ChurnKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FileChanged => "file_changed",
            Self::LspBusy => "lsp_busy",
        }
    }
}

impl fmt::Display for ChurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound notification from a churn or stability source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The project is mid-change.
    Churn(ChurnKind),
    /// A disruptive background process (e.g. re-indexing) has finished.
    StabilityHint,
}

/// Why a cooldown period ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The stability window elapsed after a stability hint with no new churn.
    Stable,
    /// The safety ceiling elapsed since the most recent churn.
    Timeout,
}

impl EndReason {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cooldown state transition.
///
/// Only edges are reported: a self-transition never produces an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownEvent {
    /// `Idle` → `Active`.
    Active,
    /// `Active` → `Idle`.
    Ended {
        /// Which timer ended the cooldown.
        reason: EndReason,
    },
}

impl CooldownEvent {
    /// Returns the event type string used in logs and UI layers.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Active => "cooldown:active",
            Self::Ended { .. } => "cooldown:ended",
        }
    }

    /// Returns true for the `cooldown:ended` edge.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }
}

impl fmt::Display for CooldownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str(self.event_type()),
            Self::Ended { reason } => write!(f, "{} ({reason})", self.event_type()),
        }
    }
}
