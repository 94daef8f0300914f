//! # Uado
//!
//! Cooldown-aware prompt orchestration for AI coding assistants.
//!
//! Uado watches for signs that a project is mid-change (file edits, a busy
//! language server) and holds back prompt submissions until the project
//! settles, then replays them in order.
//!
//! ## Features
//!
//! - Two-state cooldown engine with a safety ceiling and a stability window
//! - FIFO prompt queue that drains on `cooldown:ended`
//! - Bag-of-words cosine ranking of stored prompt patterns
//! - Canonical-JSON SHA-256 content hashing
//!
//! ## Example
//!
//! ```rust
//! use uado::cooldown::{CooldownConfig, CooldownEngine};
//! use uado::models::ChurnKind;
//! use uado::orchestrator::PromptOrchestrator;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let engine = CooldownEngine::new(CooldownConfig::default());
//! let orchestrator = PromptOrchestrator::new(engine.clone());
//!
//! engine.churn_heavy(ChurnKind::FileChanged);
//! let reply = orchestrator.wrap_prompt(|| async { "sent" });
//! assert_eq!(orchestrator.queue_len(), 1);
//!
//! engine.stability_hint();
//! assert_eq!(reply.await, "sent");
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod cooldown;
pub mod models;
pub mod observability;
pub mod orchestrator;
pub mod services;
pub mod signals;
pub mod storage;

// Re-exports for convenience
pub use config::{LogLevel, PromptMode, UadoConfig};
pub use cooldown::{CooldownConfig, CooldownEngine, CooldownState};
pub use models::{ChurnKind, CooldownEvent, EndReason, PatternEntry, Signal};
pub use orchestrator::PromptOrchestrator;
pub use services::{ContentHasher, find_best_matches};
pub use signals::SignalSink;

/// Error type for uado operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed JSON given to the hash command, empty required arguments |
/// | `OperationFailed` | Filesystem I/O errors, unparsable pattern or config files |
/// | `Serialization` | A value cannot be converted to JSON for hashing |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Reading or writing `.uado/` files fails
    /// - A pattern or config file is not valid JSON
    /// - Reading language server output fails
    /// - The tracing subscriber cannot be installed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A value could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result type alias for uado operations.
pub type Result<T> = std::result::Result<T, Error>;
