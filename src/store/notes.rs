//! Rows of the `notes` table.

use super::{StoreResult, format_timestamp, timestamp_column};
use crate::domain::{Note, NoteId, NoteType, StoredFields};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A note as persisted: title and content in stored (possibly encrypted) form.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRow {
    pub note_id: NoteId,
    pub stored: StoredFields,
    pub note_type: NoteType,
    pub mime: String,
    pub is_protected: bool,
    pub is_deleted: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl NoteRow {
    /// Builds a row for an unprotected note, storing its fields as they are.
    pub fn plain(note: &Note) -> Self {
        Self::with_stored(
            note,
            StoredFields::new(note.title(), note.content()),
        )
    }

    /// Builds a row from a note and its already-encoded fields.
    pub fn with_stored(note: &Note, stored: StoredFields) -> Self {
        Self {
            note_id: note.id().clone(),
            stored,
            note_type: note.note_type(),
            mime: note.mime().to_string(),
            is_protected: note.is_protected(),
            is_deleted: note.is_deleted(),
            created: note.created(),
            modified: note.modified(),
        }
    }
}

const COLUMNS: &str = "note_id, title, content, type, mime, is_protected, is_deleted, \
                       date_created, date_modified";

fn from_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    let type_text: String = row.get(3)?;
    let note_type = type_text
        .parse::<NoteType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(NoteRow {
        note_id: row.get(0)?,
        stored: StoredFields::new(row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?),
        note_type,
        mime: row.get(4)?,
        is_protected: row.get(5)?,
        is_deleted: row.get(6)?,
        created: timestamp_column(row, 7)?,
        modified: timestamp_column(row, 8)?,
    })
}

pub fn get(conn: &Connection, id: &NoteId) -> StoreResult<Option<NoteRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM notes WHERE note_id = ?1"),
            [id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn insert(conn: &Connection, row: &NoteRow) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO notes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
        params![
            row.note_id,
            row.stored.title,
            row.stored.content,
            row.note_type.as_str(),
            row.mime,
            row.is_protected,
            row.is_deleted,
            format_timestamp(row.created),
            format_timestamp(row.modified),
        ],
    )?;
    Ok(())
}

/// Writes every mutable column. Returns false if no such note exists.
pub fn update(conn: &Connection, row: &NoteRow) -> StoreResult<bool> {
    let changed = conn.execute(
        "UPDATE notes SET title = ?2, content = ?3, type = ?4, mime = ?5,
             is_protected = ?6, is_deleted = ?7, date_modified = ?8
         WHERE note_id = ?1",
        params![
            row.note_id,
            row.stored.title,
            row.stored.content,
            row.note_type.as_str(),
            row.mime,
            row.is_protected,
            row.is_deleted,
            format_timestamp(row.modified),
        ],
    )?;
    Ok(changed > 0)
}

pub fn set_deleted(
    conn: &Connection,
    id: &NoteId,
    deleted: bool,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE notes SET is_deleted = ?2, date_modified = ?3 WHERE note_id = ?1",
        params![id, deleted, format_timestamp(now)],
    )?;
    Ok(())
}

fn collect_ids(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> StoreResult<Vec<NoteId>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map(args, |row| row.get::<_, NoteId>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// Ids of every live note.
pub fn live_ids(conn: &Connection) -> StoreResult<Vec<NoteId>> {
    collect_ids(
        conn,
        "SELECT note_id FROM notes WHERE is_deleted = 0 ORDER BY note_id",
        [],
    )
}

/// Ids of every live protected note.
pub fn protected_live_ids(conn: &Connection) -> StoreResult<Vec<NoteId>> {
    collect_ids(
        conn,
        "SELECT note_id FROM notes WHERE is_deleted = 0 AND is_protected = 1 ORDER BY note_id",
        [],
    )
}

/// Ids of soft-deleted notes last modified before `before`.
pub fn deleted_before(conn: &Connection, before: DateTime<Utc>) -> StoreResult<Vec<NoteId>> {
    let mut stmt = conn.prepare(
        "SELECT note_id, date_modified FROM notes WHERE is_deleted = 1 ORDER BY note_id",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, NoteId>(0)?, timestamp_column(row, 1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows
        .into_iter()
        .filter(|(_, modified)| *modified < before)
        .map(|(id, _)| id)
        .collect())
}

/// Removes the note row for good. Dependent rows must be gone first.
pub fn erase(conn: &Connection, id: &NoteId) -> StoreResult<()> {
    conn.execute("DELETE FROM notes WHERE note_id = ?1", [id])?;
    Ok(())
}
