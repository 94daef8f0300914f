//! Pattern-aware prompt augmentation.

use std::fmt::Write as _;

use crate::models::PatternEntry;

/// Prepends matched examples to a prompt.
///
/// Each example contributes its prompt, target file, and output snippet.
/// With no examples the prompt is returned unchanged.
///
/// # Example
///
/// ```rust
/// use uado::models::PatternEntry;
/// use uado::services::inject_examples;
///
/// let example = PatternEntry::new("Create a React button", "src/Button.tsx", "<button/>");
/// let prompt = inject_examples("Build a button", &[&example]);
/// assert!(prompt.starts_with("Here are examples"));
/// assert!(prompt.ends_with("Build a button"));
/// assert_eq!(inject_examples("Build a button", &[]), "Build a button");
/// ```
#[must_use]
pub fn inject_examples(prompt: &str, examples: &[&PatternEntry]) -> String {
    if examples.is_empty() {
        return prompt.to_string();
    }

    let mut out = String::from("Here are examples of similar prompts that worked well:\n");
    for (i, example) in examples.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n### Example {}\nPrompt: {}\nFile: {}\nOutput:\n{}\n",
            i + 1,
            example.prompt.trim(),
            example.file,
            example.output_snippet.trim_end()
        );
    }
    out.push_str("\n### Task\n");
    out.push_str(prompt);
    out
}
