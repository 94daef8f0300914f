//! Cooldown detection.
//!
//! A two-state automaton (`Idle`, `Active`) driven by churn signals and
//! stability hints:
//!
//! - [`machine`] holds the pure transition table
//! - [`CooldownEngine`] owns the single pending timer and publishes
//!   `cooldown:active` / `cooldown:ended` edges to subscribers
//!
//! # Architecture
//!
//! ```text
//! churn sources ──► CooldownEngine ──► broadcast<CooldownEvent> ──► PromptOrchestrator
//!                      │      ▲
//!                      ▼      │ TimerFired { epoch }
//!                   CooldownMachine + one tokio timer task
//! ```

mod config;
mod engine;
pub mod machine;

pub use config::{
    CooldownConfig, DEFAULT_STABLE_WINDOW_MS, DEFAULT_TIMEOUT_MS, MAX_DURATION_MS,
};
pub use engine::CooldownEngine;
pub use machine::CooldownState;
