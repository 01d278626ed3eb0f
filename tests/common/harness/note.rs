//! Builder for test notes with sensible defaults.

#![allow(dead_code)]

use grove::domain::NoteType;

/// Builder for notes created through `grove new`.
///
/// Defaults to a plain text note under the root.
#[derive(Debug, Clone)]
pub struct TestNote {
    title: String,
    content: String,
    parent: Option<String>,
    note_type: NoteType,
    prefix: Option<String>,
    protected: bool,
}

impl TestNote {
    /// Creates a new test note with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            parent: None,
            note_type: NoteType::Text,
            prefix: None,
            protected: false,
        }
    }

    /// Sets the content (builder method).
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Places the note under `parent` instead of the root.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn note_type(mut self, note_type: NoteType) -> Self {
        self.note_type = note_type;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Marks the note protected; creating it needs the password.
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Arguments for `grove new`, without the output format.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "new".to_string(),
            self.title.clone(),
            "--content".to_string(),
            self.content.clone(),
            "--type".to_string(),
            self.note_type.to_string(),
        ];
        if let Some(parent) = &self.parent {
            args.push("--parent".to_string());
            args.push(parent.clone());
        }
        if let Some(prefix) = &self.prefix {
            args.push("--prefix".to_string());
            args.push(prefix.clone());
        }
        if self.protected {
            args.push("--protected".to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_defaults() {
        let note = TestNote::new("Plain");
        assert_eq!(
            note.to_args(),
            ["new", "Plain", "--content", "", "--type", "text"]
        );
        assert!(!note.is_protected());
    }

    #[test]
    fn test_note_builder_adds_flags() {
        let args = TestNote::new("Code")
            .content("fn main() {}")
            .note_type(NoteType::Code)
            .parent("root")
            .prefix("ex")
            .protected()
            .to_args();
        assert!(args.contains(&"code".to_string()));
        assert!(args.windows(2).any(|w| w == ["--parent", "root"]));
        assert!(args.windows(2).any(|w| w == ["--prefix", "ex"]));
        assert_eq!(args.last().unwrap(), "--protected");
    }
}
