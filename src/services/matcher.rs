//! Bag-of-words similarity ranking for stored pattern examples.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::instrument;

use crate::models::PatternEntry;

/// Runs of non-word characters separate tokens.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").unwrap_or_else(|_| unreachable!()));

/// A pattern entry paired with its similarity to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPattern<'a> {
    /// The matched entry.
    pub entry: &'a PatternEntry,
    /// Cosine similarity in `(0, 1]`.
    pub score: f64,
}

/// Lowercases `text` and splits it on runs of non-word characters.
///
/// # Example
///
/// ```rust
/// use uado::services::tokenize;
///
/// assert_eq!(tokenize("Build a React-button!"), vec!["build", "a", "react", "button"]);
/// assert!(tokenize("  ...  ").is_empty());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity between the token-count vectors of `a` and `b`.
///
/// Returns `0.0` when either side has no tokens.
///
/// # Example
///
/// ```rust
/// use uado::services::similarity;
///
/// assert!(similarity("create react button", "react button") > 0.0);
/// assert_eq!(similarity("alpha", "beta"), 0.0);
/// assert_eq!(similarity("", "beta"), 0.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let counts_a = term_counts(a);
    let counts_b = term_counts(b);
    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    // Integer accumulation keeps the score exactly symmetric.
    let dot: u64 = counts_a
        .iter()
        .filter_map(|(token, ca)| counts_b.get(token).map(|cb| ca * cb))
        .sum();
    if dot == 0 {
        return 0.0;
    }
    let norm_a: u64 = counts_a.values().map(|c| c * c).sum();
    let norm_b: u64 = counts_b.values().map(|c| c * c).sum();

    dot as f64 / ((norm_a as f64).sqrt() * (norm_b as f64).sqrt())
}

/// Scores every entry against `query` and returns the positive matches,
/// best first, ties kept in input order, truncated to `top_n`.
#[must_use]
#[instrument(skip(query, entries), fields(entries = entries.len()))]
pub fn rank_matches<'a>(
    query: &str,
    entries: &'a [PatternEntry],
    top_n: usize,
) -> Vec<ScoredPattern<'a>> {
    if top_n == 0 {
        return Vec::new();
    }
    let mut scored: Vec<ScoredPattern<'a>> = entries
        .iter()
        .map(|entry| ScoredPattern {
            entry,
            score: similarity(query, &entry.prompt),
        })
        .filter(|s| s.score > 0.0)
        .collect();

    // `sort_by` is stable, so equal scores keep their input order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    tracing::debug!(matched = scored.len(), "ranked pattern matches");
    scored
}

/// Returns the `top_n` entries most similar to `query`.
///
/// Entries scoring `0` are never returned; an empty collection or a query
/// with no overlapping tokens yields an empty result.
///
/// # Example
///
/// ```rust
/// use uado::models::PatternEntry;
/// use uado::services::find_best_matches;
///
/// let entries = vec![
///     PatternEntry::new("Create a React button", "src/Button.tsx", "<button/>"),
///     PatternEntry::new("Utility fn", "src/util.ts", "export function"),
/// ];
/// let best = find_best_matches("Build a react button component", &entries, 3);
/// assert_eq!(best.len(), 1);
/// assert_eq!(best[0].file, "src/Button.tsx");
/// ```
#[must_use]
pub fn find_best_matches<'a>(
    query: &str,
    entries: &'a [PatternEntry],
    top_n: usize,
) -> Vec<&'a PatternEntry> {
    rank_matches(query, entries, top_n)
        .into_iter()
        .map(|s| s.entry)
        .collect()
}
