//! Rows of the `labels` table.

use super::StoreResult;
use crate::domain::{Label, LabelName, NoteId};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

/// Sets or revives a label on a note.
pub fn set(conn: &Connection, note: &NoteId, label: &Label) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO labels (note_id, name, value, is_deleted) VALUES (?1, ?2, ?3, 0)
         ON CONFLICT(note_id, name) DO UPDATE SET value = excluded.value, is_deleted = 0",
        params![note, label.name.as_str(), label.value],
    )?;
    Ok(())
}

/// Soft-deletes one label. Returns false if it was not present.
pub fn remove(conn: &Connection, note: &NoteId, name: &LabelName) -> StoreResult<bool> {
    let changed = conn.execute(
        "UPDATE labels SET is_deleted = 1 WHERE note_id = ?1 AND name = ?2 AND is_deleted = 0",
        params![note, name.as_str()],
    )?;
    Ok(changed > 0)
}

/// Soft-deletes every label of a note.
pub fn remove_all(conn: &Connection, note: &NoteId) -> StoreResult<usize> {
    let changed = conn.execute(
        "UPDATE labels SET is_deleted = 1 WHERE note_id = ?1 AND is_deleted = 0",
        [note],
    )?;
    Ok(changed)
}

/// Live labels of a note, by name.
pub fn list(conn: &Connection, note: &NoteId) -> StoreResult<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT name, value FROM labels WHERE note_id = ?1 AND is_deleted = 0 ORDER BY name",
    )?;
    let labels = stmt
        .query_map([note], |row| {
            let name: String = row.get(0)?;
            let name = name
                .parse::<LabelName>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
            Ok(Label::new(name, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(labels)
}

pub fn has(conn: &Connection, note: &NoteId, name: &LabelName) -> StoreResult<bool> {
    let found = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM labels WHERE note_id = ?1 AND name = ?2 AND is_deleted = 0)",
        params![note, name.as_str()],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(found)
}

pub fn erase_for_note(conn: &Connection, note: &NoteId) -> StoreResult<usize> {
    Ok(conn.execute("DELETE FROM labels WHERE note_id = ?1", [note])?)
}
