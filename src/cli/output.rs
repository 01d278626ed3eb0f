//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{Branch, Note};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A note as printed by `show` and `new`.
#[derive(Debug, Serialize)]
pub struct NoteView {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub mime: String,
    pub protected: bool,
    pub deleted: bool,
    /// False when the note is protected and no password was given.
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created: String,
    pub modified: String,
}

impl NoteView {
    pub fn from_note(note: &Note, with_content: bool) -> Self {
        Self {
            id: note.id().to_string(),
            title: note.title().to_string(),
            note_type: note.note_type().to_string(),
            mime: note.mime().to_string(),
            protected: note.is_protected(),
            deleted: note.is_deleted(),
            available: note.is_content_available(),
            content: (with_content && note.is_content_available()).then(|| note.content_text()),
            created: note.created().to_rfc3339(),
            modified: note.modified().to_rfc3339(),
        }
    }
}

/// One node of `tree` output.
#[derive(Debug, Serialize)]
pub struct TreeNode {
    pub branch_id: String,
    pub note_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub protected: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(branch: &Branch, note: &Note) -> Self {
        Self {
            branch_id: branch.branch_id.to_string(),
            note_id: note.id().to_string(),
            title: note.title().to_string(),
            prefix: branch.prefix.clone(),
            protected: note.is_protected(),
            children: Vec::new(),
        }
    }
}

/// A search hit.
#[derive(Debug, Serialize)]
pub struct SearchListing {
    pub id: String,
    pub title: String,
}
