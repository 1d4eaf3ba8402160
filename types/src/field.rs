//! Explicit absence-of-value marker for scraped metadata fields.
//!
//! Scrape runs emit JSON `null`, omit keys, or write the literal string
//! `"null"` when a value could not be extracted. All three collapse into
//! [`Field::Unknown`] at the canonicalization boundary. On the wire, Unknown
//! is rendered as the string `"null"` so downstream consumers keep working.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The placeholder string scrape runs use in place of a missing value.
pub const PLACEHOLDER: &str = "null";

/// A string field that is either a well-formed value or explicitly unknown.
///
/// An empty string is a parsed value, not an unknown one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Field {
    Value(String),
    #[default]
    Unknown,
}

impl Field {
    /// Build a field from a string, mapping the placeholder to `Unknown`.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text == PLACEHOLDER {
            Self::Unknown
        } else {
            Self::Value(text)
        }
    }

    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Wire representation: the value itself, or the placeholder.
    #[must_use]
    pub fn as_wire_str(&self) -> &str {
        self.as_deref().unwrap_or(PLACEHOLDER)
    }

    /// Apply `f` to a known value; `Unknown` stays `Unknown`.
    #[must_use]
    pub fn map(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::Value(value) => Self::Value(f(value)),
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<Option<String>> for Field {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Unknown, Self::from_text)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, PLACEHOLDER};

    #[test]
    fn placeholder_text_is_unknown() {
        assert_eq!(Field::from_text("null"), Field::Unknown);
        assert_eq!(Field::from(None), Field::Unknown);
    }

    #[test]
    fn empty_string_is_a_value() {
        assert_eq!(Field::from_text(""), Field::Value(String::new()));
        assert!(!Field::from_text("").is_unknown());
    }

    #[test]
    fn unknown_serializes_as_placeholder_string() {
        let json = serde_json::to_string(&Field::Unknown).expect("serialize");
        assert_eq!(json, format!("\"{PLACEHOLDER}\""));
    }

    #[test]
    fn json_null_and_placeholder_deserialize_to_unknown() {
        let from_null: Field = serde_json::from_str("null").expect("null");
        let from_text: Field = serde_json::from_str("\"null\"").expect("placeholder");
        let from_value: Field = serde_json::from_str("\"Rust\"").expect("value");

        assert_eq!(from_null, Field::Unknown);
        assert_eq!(from_text, Field::Unknown);
        assert_eq!(from_value, Field::Value("Rust".to_string()));
    }

    #[test]
    fn map_leaves_unknown_alone() {
        let mapped = Field::Unknown.map(|s| s.to_uppercase());
        assert_eq!(mapped, Field::Unknown);

        let mapped = Field::from("rust").map(|s| s.to_uppercase());
        assert_eq!(mapped.as_deref(), Some("RUST"));
    }
}
