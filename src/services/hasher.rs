//! Canonical content hashing.
//!
//! Structured values are serialized with object keys sorted at every
//! nesting level before hashing, so the digest depends only on logical
//! content and never on in-memory field order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Canonical SHA256 hasher for de-duplication and content-addressed names.
///
/// # Canonical form
///
/// - Object keys are sorted lexicographically (by byte order) at every level
/// - Arrays keep their element order
/// - Scalars use standard JSON encoding
/// - No insignificant whitespace
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use uado::services::ContentHasher;
///
/// let a = ContentHasher::compute_hash(&json!({"prompt": "x", "file": "a.ts"}));
/// let b = ContentHasher::compute_hash(&json!({"file": "a.ts", "prompt": "x"}));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub struct ContentHasher;

impl ContentHasher {
    /// Serializes a JSON value in canonical form.
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde_json::json;
    /// use uado::services::ContentHasher;
    ///
    /// let canonical = ContentHasher::canonicalize(&json!({"b": [2, 1], "a": {"d": null, "c": "x"}}));
    /// assert_eq!(canonical, r#"{"a":{"c":"x","d":null},"b":[2,1]}"#);
    /// ```
    #[must_use]
    pub fn canonicalize(value: &Value) -> String {
        let mut out = String::new();
        write_canonical(value, &mut out);
        out
    }

    /// Computes the lowercase hex SHA256 digest of the canonical form.
    #[must_use]
    pub fn compute_hash(value: &Value) -> String {
        Self::digest(Self::canonicalize(value).as_bytes())
    }

    /// Hashes any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the value cannot be represented as
    /// JSON (for example a map with non-string keys).
    pub fn hash_serializable<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let value =
            serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Self::compute_hash(&value))
    }

    /// Hashes a text value, treating it as a JSON string scalar.
    ///
    /// Used for snapshot naming.
    #[must_use]
    pub fn hash_text(text: &str) -> String {
        Self::compute_hash(&Value::String(text.to_string()))
    }

    /// Hashes the UTF-8 bytes of a text as-is, without JSON quoting.
    ///
    /// This is the digest stored in a pattern entry's `hash` field.
    #[must_use]
    pub fn hash_raw(text: &str) -> String {
        Self::digest(text.as_bytes())
    }

    fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        },
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(child) = map.get(key) {
                    write_canonical(child, out);
                }
            }
            out.push('}');
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}
