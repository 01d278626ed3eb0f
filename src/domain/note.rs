//! Note entity: identity, type, protection and lifecycle flags.

use crate::domain::{NoteId, OpenFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a note's content represents. The core treats content as bytes; the
/// type only decides how text is extracted for the fulltext index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    #[default]
    Text,
    Code,
    File,
    Image,
    Search,
    Render,
    Book,
}

impl NoteType {
    pub const ALL: [NoteType; 7] = [
        NoteType::Text,
        NoteType::Code,
        NoteType::File,
        NoteType::Image,
        NoteType::Search,
        NoteType::Render,
        NoteType::Book,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteType::Text => "text",
            NoteType::Code => "code",
            NoteType::File => "file",
            NoteType::Image => "image",
            NoteType::Search => "search",
            NoteType::Render => "render",
            NoteType::Book => "book",
        }
    }

    /// Mime type given to new notes of this type when none is supplied.
    pub fn default_mime(self) -> &'static str {
        match self {
            NoteType::Text | NoteType::Book => "text/html",
            NoteType::Code => "text/plain",
            NoteType::Search => "application/json",
            NoteType::File | NoteType::Image | NoteType::Render => "application/octet-stream",
        }
    }

    /// Search notes hold a saved query and cannot have children.
    pub fn accepts_children(self) -> bool {
        self != NoteType::Search
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown note type.
#[derive(Debug, Clone)]
pub struct ParseNoteTypeError(String);

impl fmt::Display for ParseNoteTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown note type '{}'", self.0)
    }
}

impl std::error::Error for ParseNoteTypeError {}

impl FromStr for NoteType {
    type Err = ParseNoteTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseNoteTypeError(s.to_string()))
    }
}

/// A note as seen by callers of the notebook.
///
/// Title and content live in [`OpenFields`]: for a protected note loaded
/// without an active protected session they are placeholders, and
/// [`Note::is_content_available`] returns false.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    id: NoteId,
    fields: OpenFields,
    note_type: NoteType,
    mime: String,
    is_protected: bool,
    is_deleted: bool,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Note {
    /// Creates a note that has not been stored yet.
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<Vec<u8>>,
        note_type: NoteType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            fields: OpenFields::plain(title, content),
            note_type,
            mime: note_type.default_mime().to_string(),
            is_protected: false,
            is_deleted: false,
            created: now,
            modified: now,
        }
    }

    /// Reassembles a note from decoded row values.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: NoteId,
        fields: OpenFields,
        note_type: NoteType,
        mime: String,
        is_protected: bool,
        is_deleted: bool,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            fields,
            note_type,
            mime,
            is_protected,
            is_deleted,
            created,
            modified,
        }
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn title(&self) -> &str {
        self.fields.title()
    }

    pub fn content(&self) -> &[u8] {
        self.fields.content()
    }

    /// Content as UTF-8 text, lossily converted.
    pub fn content_text(&self) -> String {
        String::from_utf8_lossy(self.fields.content()).into_owned()
    }

    pub fn note_type(&self) -> NoteType {
        self.note_type
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn is_protected(&self) -> bool {
        self.is_protected
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// False for a protected note loaded while the protected session is locked.
    pub fn is_content_available(&self) -> bool {
        self.fields.is_available()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn fields(&self) -> &OpenFields {
        &self.fields
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.fields.set_title(title);
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.fields.set_content(content);
    }

    pub fn set_note_type(&mut self, note_type: NoteType) {
        self.note_type = note_type;
    }

    pub fn set_mime(&mut self, mime: impl Into<String>) {
        self.mime = mime.into();
    }

    /// Changes the protection flag. Saving a note whose protection changed
    /// needs an unlocked protected session.
    pub fn set_protected(&mut self, protected: bool) {
        if self.is_protected != protected {
            self.is_protected = protected;
            self.fields.mark_dirty();
        }
    }

    pub(crate) fn fields_mut(&mut self) -> &mut OpenFields {
        &mut self.fields
    }

    pub(crate) fn set_modified(&mut self, modified: DateTime<Utc>) {
        self.modified = modified;
    }

    pub(crate) fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}
