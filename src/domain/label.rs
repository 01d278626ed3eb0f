//! Labels: named attributes attached to notes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label that takes a note out of the fulltext index.
pub const ARCHIVED_LABEL: &str = "archived";

/// A validated label name.
///
/// # Validation Rules
/// - Non-empty after trimming
/// - Only ASCII letters, digits, `_`, `-` and `:`
///
/// Names are case-sensitive; `Archived` is not `archived`.
///
/// # Examples
///
/// ```
/// use grove::domain::LabelName;
///
/// let name = LabelName::new(" archived ").unwrap();
/// assert_eq!(name.as_str(), "archived");
/// assert!(name.is_archived());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelName(String);

/// Error returned when parsing an invalid label name.
#[derive(Debug, Clone)]
pub struct ParseLabelError(String);

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseLabelError {}

impl LabelName {
    /// Creates a label name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ParseLabelError` if the name is empty or contains characters
    /// other than ASCII alphanumerics, `_`, `-` and `:`.
    pub fn new(s: &str) -> Result<Self, ParseLabelError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ParseLabelError("label name cannot be empty".to_string()));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
        {
            return Err(ParseLabelError(format!(
                "invalid label '{}': only alphanumeric characters, '_', '-' and ':' are allowed",
                trimmed
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The `archived` label.
    pub fn archived() -> Self {
        Self(ARCHIVED_LABEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_archived(&self) -> bool {
        self.0 == ARCHIVED_LABEL
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelName(\"{}\")", self.0)
    }
}

impl FromStr for LabelName {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for LabelName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LabelName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A label with its (possibly empty) value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: LabelName,
    pub value: String,
}

impl Label {
    pub fn new(name: LabelName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(LabelName::new("  todo  ").unwrap().as_str(), "todo");
    }

    #[test]
    fn names_are_case_sensitive() {
        let upper = LabelName::new("Archived").unwrap();
        assert!(!upper.is_archived());
        assert!(LabelName::archived().is_archived());
    }

    #[test]
    fn empty_name_rejected() {
        let err = LabelName::new("   ").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn namespaced_name_accepted() {
        assert!(LabelName::new("share:alias").is_ok());
        assert!(LabelName::new("sort-direction").is_ok());
    }

    #[test]
    fn invalid_characters_rejected() {
        let err = LabelName::new("has space").unwrap_err();
        assert!(err.to_string().contains("has space"));
        assert!(LabelName::new("a/b").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let label = Label::new(LabelName::new("color").unwrap(), "red");
        let json = serde_json::to_string(&label).unwrap();
        let parsed: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(label, parsed);
    }
}
