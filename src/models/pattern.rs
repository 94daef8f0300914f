//! Stored prompt/output examples.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::services::ContentHasher;

/// Tag used for entries logged without one.
pub const DEFAULT_TAG: &str = "general";

/// A previously successful prompt and a snippet of what it produced.
///
/// Entries are immutable once written. Uniqueness is enforced through
/// [`PatternEntry::content_hash`], which depends only on the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternEntry {
    /// The prompt text.
    pub prompt: String,
    /// The file the output was written to.
    pub file: String,
    /// A short excerpt of the generated output.
    pub output_snippet: String,
    /// Optional grouping tag (e.g. `react-component`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Optional difficulty label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Content hash of the prompt, stamped when the entry is logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl PatternEntry {
    /// Creates an untagged entry.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        file: impl Into<String>,
        output_snippet: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            file: file.into(),
            output_snippet: output_snippet.into(),
            tag: None,
            difficulty: None,
            hash: None,
        }
    }

    /// Builder method to set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Builder method to set the difficulty.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    /// Returns the tag, or [`DEFAULT_TAG`] when unset.
    #[must_use]
    pub fn tag_or_default(&self) -> &str {
        self.tag.as_deref().unwrap_or(DEFAULT_TAG)
    }

    /// Returns the stored hash, or the raw SHA-256 of the prompt.
    #[must_use]
    pub fn content_hash(&self) -> String {
        self.hash
            .clone()
            .unwrap_or_else(|| ContentHasher::hash_raw(&self.prompt))
    }
}

/// A persisted pattern collection, either flat or grouped by tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternCollection {
    /// A plain array of entries.
    Flat(Vec<PatternEntry>),
    /// Entries grouped under their tag, in file order.
    Grouped(IndexMap<String, Vec<PatternEntry>>),
}

impl Default for PatternCollection {
    fn default() -> Self {
        Self::Grouped(IndexMap::new())
    }
}

impl PatternCollection {
    /// Flattens the collection in file order.
    #[must_use]
    pub fn into_entries(self) -> Vec<PatternEntry> {
        match self {
            Self::Flat(entries) => entries,
            Self::Grouped(groups) => groups.into_values().flatten().collect(),
        }
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &PatternEntry> + '_> {
        match self {
            Self::Flat(entries) => Box::new(entries.iter()),
            Self::Grouped(groups) => Box::new(groups.values().flatten()),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(entries) => entries.len(),
            Self::Grouped(groups) => groups.values().map(Vec::len).sum(),
        }
    }

    /// Returns true when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if an entry was already logged for `prompt`.
    ///
    /// Stored hashes are compared against both the raw prompt digest and
    /// the canonical JSON string digest written by earlier releases.
    #[must_use]
    pub fn contains_prompt(&self, prompt: &str) -> bool {
        let raw = ContentHasher::hash_raw(prompt);
        let quoted = ContentHasher::hash_text(prompt);
        self.iter().any(|entry| {
            let hash = entry.content_hash();
            hash == raw || hash == quoted
        })
    }

    /// Converts to the grouped shape. Flat entries land under [`DEFAULT_TAG`].
    #[must_use]
    pub fn into_grouped(self) -> IndexMap<String, Vec<PatternEntry>> {
        match self {
            Self::Flat(entries) if entries.is_empty() => IndexMap::new(),
            Self::Flat(entries) => IndexMap::from([(DEFAULT_TAG.to_string(), entries)]),
            Self::Grouped(groups) => groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_flat() {
        let json = r#"[{"prompt":"a","file":"f.ts","outputSnippet":"x"}]"#;
        let collection: PatternCollection = serde_json::from_str(json).unwrap();
        assert!(matches!(collection, PatternCollection::Flat(_)));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_deserialize_grouped() {
        let json = r#"{
            "utility": [{"prompt":"u","file":"u.ts","outputSnippet":"x","tag":"utility"}],
            "react-component": [
                {"prompt":"a","file":"a.tsx","outputSnippet":"x"},
                {"prompt":"b","file":"b.tsx","outputSnippet":"y","difficulty":"easy"}
            ]
        }"#;
        let collection: PatternCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.len(), 3);
        let prompts: Vec<_> = collection
            .into_entries()
            .into_iter()
            .map(|e| e.prompt)
            .collect();
        assert_eq!(prompts, vec!["u", "a", "b"]);
    }

    #[test]
    fn test_serialize_skips_absent_optionals() {
        let entry = PatternEntry::new("p", "f", "s");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"prompt":"p","file":"f","outputSnippet":"s"}"#);
    }

    #[test]
    fn test_flat_into_grouped_uses_default_tag() {
        let collection = PatternCollection::Flat(vec![PatternEntry::new("p", "f", "s")]);
        let grouped = collection.into_grouped();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[DEFAULT_TAG].len(), 1);
    }

    #[test]
    fn test_content_hash_prefers_stored_hash() {
        let mut entry = PatternEntry::new("p", "f", "s");
        let computed = entry.content_hash();
        assert_eq!(computed.len(), 64);

        entry.hash = Some("abc".to_string());
        assert_eq!(entry.content_hash(), "abc");
    }

    #[test]
    fn test_contains_prompt_accepts_both_digests() {
        let mut raw = PatternEntry::new("Create a React button", "b.tsx", "x");
        raw.hash =
            Some("23640b4666f8a64c417a25ea7e9c93e308e258b0988db23daf5fbf1c4dd30593".to_string());
        let mut quoted = PatternEntry::new("Utility fn", "u.ts", "x");
        quoted.hash = Some(ContentHasher::hash_text("Utility fn"));

        let collection = PatternCollection::Flat(vec![raw, quoted]);
        assert!(collection.contains_prompt("Create a React button"));
        assert!(collection.contains_prompt("Utility fn"));
        assert!(!collection.contains_prompt("Create a React header"));
    }

    #[test]
    fn test_tag_or_default() {
        assert_eq!(PatternEntry::new("p", "f", "s").tag_or_default(), "general");
        assert_eq!(
            PatternEntry::new("p", "f", "s")
                .with_tag("utility")
                .tag_or_default(),
            "utility"
        );
    }
}
