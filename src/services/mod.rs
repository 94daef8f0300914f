//! Stateless services: pattern ranking, content hashing, and prompt helpers.

mod explain;
mod hasher;
mod injection;
mod matcher;

pub use explain::explain_pattern;
pub use hasher::ContentHasher;
pub use injection::inject_examples;
pub use matcher::{ScoredPattern, find_best_matches, rank_matches, similarity, tokenize};
