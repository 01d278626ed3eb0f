//! Revision: a stored snapshot of a note's title and content.

use crate::domain::{NoteId, OpenFields, RevisionId};
use chrono::{DateTime, Utc};

/// A point-in-time copy of a note.
///
/// Revisions carry the protection flag of their note; protecting or
/// unprotecting a note re-encodes its revisions too.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    id: RevisionId,
    note_id: NoteId,
    fields: OpenFields,
    is_protected: bool,
    created: DateTime<Utc>,
}

impl Revision {
    pub(crate) fn from_parts(
        id: RevisionId,
        note_id: NoteId,
        fields: OpenFields,
        is_protected: bool,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            note_id,
            fields,
            is_protected,
            created,
        }
    }

    pub fn id(&self) -> &RevisionId {
        &self.id
    }

    pub fn note_id(&self) -> &NoteId {
        &self.note_id
    }

    pub fn title(&self) -> &str {
        self.fields.title()
    }

    pub fn content(&self) -> &[u8] {
        self.fields.content()
    }

    pub fn is_protected(&self) -> bool {
        self.is_protected
    }

    pub fn is_content_available(&self) -> bool {
        self.fields.is_available()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn fields(&self) -> &OpenFields {
        &self.fields
    }

    pub(crate) fn set_protected(&mut self, protected: bool) {
        if self.is_protected != protected {
            self.is_protected = protected;
            self.fields.mark_dirty();
        }
    }
}
