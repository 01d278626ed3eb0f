//! Rows of the `revisions` table.

use super::{StoreResult, format_timestamp, timestamp_column};
use crate::domain::{NoteId, RevisionId, StoredFields};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

/// A revision as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionRow {
    pub revision_id: RevisionId,
    pub note_id: NoteId,
    pub stored: StoredFields,
    pub is_protected: bool,
    pub created: DateTime<Utc>,
}

pub fn insert(conn: &Connection, row: &RevisionRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO revisions (revision_id, note_id, title, content, is_protected, date_created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.revision_id,
            row.note_id,
            row.stored.title,
            row.stored.content,
            row.is_protected,
            format_timestamp(row.created),
        ],
    )?;
    Ok(())
}

/// Rewrites title, content and protection of an existing revision.
pub fn update(conn: &Connection, row: &RevisionRow) -> StoreResult<()> {
    conn.execute(
        "UPDATE revisions SET title = ?2, content = ?3, is_protected = ?4 WHERE revision_id = ?1",
        params![
            row.revision_id,
            row.stored.title,
            row.stored.content,
            row.is_protected,
        ],
    )?;
    Ok(())
}

/// Revisions of a note, newest first.
pub fn list_for_note(conn: &Connection, note: &NoteId) -> StoreResult<Vec<RevisionRow>> {
    let mut stmt = conn.prepare(
        "SELECT revision_id, note_id, title, content, is_protected, date_created
         FROM revisions WHERE note_id = ?1
         ORDER BY date_created DESC, revision_id DESC",
    )?;
    let rows = stmt
        .query_map([note], |row| {
            Ok(RevisionRow {
                revision_id: row.get(0)?,
                note_id: row.get(1)?,
                stored: StoredFields::new(row.get::<_, String>(2)?, row.get::<_, Vec<u8>>(3)?),
                is_protected: row.get(4)?,
                created: timestamp_column(row, 5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn erase_for_note(conn: &Connection, note: &NoteId) -> StoreResult<usize> {
    Ok(conn.execute("DELETE FROM revisions WHERE note_id = ?1", [note])?)
}
