//! Note reads and writes, revisions and labels.

use chrono::Utc;
use rusqlite::Connection;

use super::Notebook;
use crate::domain::{
    Branch, EntityKind, Label, LabelName, Note, NoteId, NoteType, Revision, RevisionId,
};
use crate::error::{Error, Result};
use crate::fulltext::index;
use crate::store::notes::NoteRow;
use crate::store::revisions::RevisionRow;
use crate::store::{labels, notes, revisions};
use crate::tree::Tree;

/// Settings for [`Notebook::create_note`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNoteOptions {
    pub note_type: NoteType,
    /// Defaults to the type's usual mime.
    pub mime: Option<String>,
    pub protected: bool,
    pub prefix: Option<String>,
}

impl NewNoteOptions {
    pub fn of_type(note_type: NoteType) -> Self {
        Self {
            note_type,
            ..Self::default()
        }
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }
}

impl Notebook {
    // ===========================================
    // Loading
    // ===========================================

    /// Decodes a row. `strict` surfaces decryption faults; otherwise they are
    /// logged and the note comes back unavailable.
    pub(super) fn note_from_row(&self, row: NoteRow, strict: bool) -> Result<Note> {
        let fields = if strict {
            match self.codec.decode(EntityKind::Note, row.is_protected, row.stored) {
                Ok(fields) => fields,
                Err(e) => {
                    log::error!("could not decrypt note {}: {}", row.note_id, e);
                    return Err(e.into());
                }
            }
        } else {
            self.codec
                .decode_lenient(EntityKind::Note, row.note_id.as_str(), row.is_protected, row.stored)
        };

        Ok(Note::from_parts(
            row.note_id,
            fields,
            row.note_type,
            row.mime,
            row.is_protected,
            row.is_deleted,
            row.created,
            row.modified,
        ))
    }

    pub(super) fn load_note(&self, conn: &Connection, id: &NoteId, strict: bool) -> Result<Note> {
        let row = notes::get(conn, id)?.ok_or_else(|| Error::NoteNotFound(id.clone()))?;
        self.note_from_row(row, strict)
    }

    /// Loads a note, deleted or not.
    ///
    /// A protected note loaded while the session is locked comes back with
    /// [`Note::is_content_available`] false.
    pub fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        self.read(|conn| match notes::get(conn, id)? {
            Some(row) => self.note_from_row(row, true).map(Some),
            None => Ok(None),
        })
    }

    /// Live children of `parent` with their notes, in branch order.
    ///
    /// One undecryptable child does not fail the listing; it comes back
    /// unavailable.
    pub fn children_notes(&self, parent: &NoteId) -> Result<Vec<(Branch, Note)>> {
        self.read(|conn| {
            let tree = Tree::new(conn);
            let mut out = Vec::new();
            for branch in tree.children(parent)? {
                let note = self.load_note(conn, &branch.note_id, false)?;
                out.push((branch, note));
            }
            Ok(out)
        })
    }

    // ===========================================
    // Writing
    // ===========================================

    /// Creates a note and its first branch under `parent`.
    pub fn create_note(
        &self,
        parent: &NoteId,
        title: &str,
        content: impl Into<Vec<u8>>,
        options: NewNoteOptions,
    ) -> Result<(Note, Branch)> {
        let mut note = Note::new(
            NoteId::generate(),
            title,
            content.into(),
            options.note_type,
            Utc::now(),
        );
        if let Some(mime) = options.mime {
            note.set_mime(mime);
        }
        note.set_protected(options.protected);

        let stored = self
            .codec
            .encode(EntityKind::Note, note.is_protected(), note.fields())?;

        let branch = self.with_tx(|conn| {
            notes::insert(conn, &NoteRow::with_stored(&note, stored.clone()))?;
            Ok(Tree::new(conn).create_branch(note.id(), parent, options.prefix.as_deref())?)
        })?;

        let sealed = note.is_protected().then_some(stored);
        note.fields_mut().mark_saved(sealed);
        self.fulltext.enqueue(note.id().clone());

        log::info!("created note {} under {}", note.id(), parent);
        Ok((note, branch))
    }

    /// Persists a note, encrypting it if it is protected.
    ///
    /// A protected note's index row is dropped in the same transaction;
    /// other index updates are left to the fulltext queue.
    ///
    /// # Errors
    ///
    /// `ProtectedSessionRequired` when a protected note's title or content
    /// changed, or its protection was toggled, while the session is locked.
    pub fn save_note(&self, note: &mut Note) -> Result<()> {
        self.with_tx(|conn| self.write_note(conn, note))?;
        self.fulltext.enqueue(note.id().clone());
        Ok(())
    }

    pub(super) fn write_note(&self, conn: &Connection, note: &mut Note) -> Result<()> {
        let existing =
            notes::get(conn, note.id())?.ok_or_else(|| Error::NoteNotFound(note.id().clone()))?;
        let protection_changed = existing.is_protected != note.is_protected();

        let stored = self
            .codec
            .encode(EntityKind::Note, note.is_protected(), note.fields())?;

        note.set_modified(Utc::now());
        note.set_deleted(existing.is_deleted);
        notes::update(conn, &NoteRow::with_stored(note, stored.clone()))?;

        if protection_changed {
            self.reprotect_revisions(conn, note.id(), note.is_protected())?;
        }
        if note.is_protected() {
            index::remove(conn, note.id())?;
        }

        let sealed = note.is_protected().then_some(stored);
        note.fields_mut().mark_saved(sealed);
        Ok(())
    }

    // ===========================================
    // Revisions
    // ===========================================

    /// Snapshots the note's current title and content.
    ///
    /// Works while locked for a protected note: the snapshot reuses the
    /// note's ciphertext.
    pub fn save_revision(&self, id: &NoteId) -> Result<Revision> {
        self.with_tx(|conn| {
            let note = self.load_note(conn, id, true)?;
            let revision = Revision::from_parts(
                RevisionId::generate(),
                id.clone(),
                note.fields().clone(),
                note.is_protected(),
                Utc::now(),
            );
            let stored =
                self.codec
                    .encode(EntityKind::Revision, revision.is_protected(), revision.fields())?;
            revisions::insert(
                conn,
                &RevisionRow {
                    revision_id: revision.id().clone(),
                    note_id: id.clone(),
                    stored,
                    is_protected: revision.is_protected(),
                    created: revision.created(),
                },
            )?;
            log::debug!("saved revision {} of note {}", revision.id(), id);
            Ok(revision)
        })
    }

    /// Revisions of a note, newest first.
    pub fn revisions(&self, id: &NoteId) -> Result<Vec<Revision>> {
        self.read(|conn| {
            let rows = revisions::list_for_note(conn, id)?;
            Ok(rows
                .into_iter()
                .map(|row| {
                    let fields = self.codec.decode_lenient(
                        EntityKind::Revision,
                        row.revision_id.as_str(),
                        row.is_protected,
                        row.stored,
                    );
                    Revision::from_parts(row.revision_id, row.note_id, fields, row.is_protected, row.created)
                })
                .collect())
        })
    }

    /// Re-encodes every revision of a note after its protection changed.
    fn reprotect_revisions(&self, conn: &Connection, id: &NoteId, protected: bool) -> Result<()> {
        for row in revisions::list_for_note(conn, id)? {
            if row.is_protected == protected {
                continue;
            }
            let fields = self
                .codec
                .decode(EntityKind::Revision, row.is_protected, row.stored)?;
            let mut revision =
                Revision::from_parts(row.revision_id, row.note_id, fields, row.is_protected, row.created);
            revision.set_protected(protected);

            let stored = self
                .codec
                .encode(EntityKind::Revision, protected, revision.fields())?;
            revisions::update(
                conn,
                &RevisionRow {
                    revision_id: revision.id().clone(),
                    note_id: revision.note_id().clone(),
                    stored,
                    is_protected: protected,
                    created: revision.created(),
                },
            )?;
        }
        Ok(())
    }

    // ===========================================
    // Labels
    // ===========================================

    /// Sets a label. The `archived` label removes the note from the index.
    pub fn set_label(&self, id: &NoteId, name: &LabelName, value: &str) -> Result<()> {
        self.with_tx(|conn| {
            self.ensure_live(conn, id)?;
            labels::set(conn, id, &Label::new(name.clone(), value))?;
            Ok(())
        })?;
        self.fulltext.enqueue(id.clone());
        Ok(())
    }

    /// Removes a label. Returns false if the note did not have it.
    pub fn remove_label(&self, id: &NoteId, name: &LabelName) -> Result<bool> {
        let removed = self.with_tx(|conn| Ok(labels::remove(conn, id, name)?))?;
        if removed {
            self.fulltext.enqueue(id.clone());
        }
        Ok(removed)
    }

    pub fn labels(&self, id: &NoteId) -> Result<Vec<Label>> {
        self.read(|conn| Ok(labels::list(conn, id)?))
    }

    fn ensure_live(&self, conn: &Connection, id: &NoteId) -> Result<()> {
        match notes::get(conn, id)? {
            Some(row) if !row.is_deleted => Ok(()),
            _ => Err(Error::NoteNotFound(id.clone())),
        }
    }
}
