//! Human readable pattern descriptions.

use crate::models::PatternEntry;

/// Describes what a tag's patterns typically do.
fn describe_tag(tag: Option<&str>) -> &'static str {
    match tag {
        Some("react-component") => "builds a React component",
        Some("utility") => "creates a small helper function",
        _ => "demonstrates a useful coding pattern",
    }
}

/// Returns a deterministic one-line explanation of a pattern.
///
/// Only the first line of the prompt is quoted.
///
/// # Example
///
/// ```rust
/// use uado::models::PatternEntry;
/// use uado::services::explain_pattern;
///
/// let entry = PatternEntry::new("Utility fn\nwith details", "src/util.ts", "export function")
///     .with_tag("utility");
/// assert_eq!(
///     explain_pattern(&entry),
///     "This pattern creates a small helper function based on the prompt \"Utility fn\"."
/// );
/// ```
#[must_use]
pub fn explain_pattern(entry: &PatternEntry) -> String {
    let preview = entry.prompt.lines().next().unwrap_or_default();
    format!(
        "This pattern {} based on the prompt \"{preview}\".",
        describe_tag(entry.tag.as_deref())
    )
}
