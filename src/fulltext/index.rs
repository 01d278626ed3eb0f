//! The `note_fulltext` side table.
//!
//! Holds plain searchable text for every live, unprotected, unarchived note
//! and nothing else. Rows are rewritten only when a hash changes.

use super::extract::extract_text;
use crate::domain::{LabelName, NoteId};
use crate::infra::ContentHash;
use crate::store::{StoreResult, labels, notes};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

/// What [`update_index`] did for one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAction {
    Inserted,
    Updated,
    Unchanged,
    /// The note is not indexable; any row for it is gone.
    Removed,
}

/// One row of the side table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulltextRecord {
    pub note_id: NoteId,
    pub title: String,
    pub title_hash: ContentHash,
    pub content: String,
    pub content_hash: ContentHash,
}

/// Counts from [`reindex_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexStats {
    pub indexed: usize,
    pub skipped: usize,
}

/// Brings the row for `note_id` in line with the note table.
///
/// Missing, deleted, protected and archived notes lose their row. Protected
/// notes are never indexed, even while the protected session is unlocked.
///
/// Only an `archived` label on the note itself counts; the label is not
/// inherited from ancestors.
pub fn update_index(conn: &Connection, note_id: &NoteId) -> StoreResult<IndexAction> {
    let note = match notes::get(conn, note_id)? {
        Some(note) if !note.is_deleted && !note.is_protected => note,
        _ => return remove(conn, note_id).map(|_| IndexAction::Removed),
    };
    if labels::has(conn, note_id, &LabelName::archived())? {
        return remove(conn, note_id).map(|_| IndexAction::Removed);
    }

    let title = note.stored.title;
    let content = extract_text(note.note_type, &note.mime, &note.stored.content);
    let title_hash = ContentHash::of_text(&title);
    let content_hash = ContentHash::of_text(&content);

    let existing = conn
        .query_row(
            "SELECT title_hash, content_hash FROM note_fulltext WHERE note_id = ?1",
            [note_id],
            |row| Ok((row.get::<_, ContentHash>(0)?, row.get::<_, ContentHash>(1)?)),
        )
        .optional()?;

    match existing {
        Some((t, c)) if t == title_hash && c == content_hash => Ok(IndexAction::Unchanged),
        Some(_) => {
            conn.execute(
                "UPDATE note_fulltext SET title = ?2, title_hash = ?3, content = ?4, content_hash = ?5
                 WHERE note_id = ?1",
                params![note_id, title, title_hash, content, content_hash],
            )?;
            Ok(IndexAction::Updated)
        }
        None => {
            conn.execute(
                "INSERT INTO note_fulltext (note_id, title, title_hash, content, content_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![note_id, title, title_hash, content, content_hash],
            )?;
            Ok(IndexAction::Inserted)
        }
    }
}

/// Deletes the row for `note_id`. Returns true if there was one.
pub fn remove(conn: &Connection, note_id: &NoteId) -> StoreResult<bool> {
    let removed = conn.execute("DELETE FROM note_fulltext WHERE note_id = ?1", [note_id])?;
    Ok(removed > 0)
}

pub fn entry(conn: &Connection, note_id: &NoteId) -> StoreResult<Option<FulltextRecord>> {
    let record = conn
        .query_row(
            "SELECT note_id, title, title_hash, content, content_hash
             FROM note_fulltext WHERE note_id = ?1",
            [note_id],
            |row| {
                Ok(FulltextRecord {
                    note_id: row.get(0)?,
                    title: row.get(1)?,
                    title_hash: row.get(2)?,
                    content: row.get(3)?,
                    content_hash: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Notes whose indexed title or text contains `query`.
///
/// Matching is a substring match, case-insensitive for ASCII letters only
/// (SQLite `LIKE`). An empty query matches nothing. Rows are checked against
/// the note table, so a row whose note was deleted, protected or archived
/// after it was indexed is never returned.
pub fn search(conn: &Connection, query: &str, limit: usize) -> StoreResult<Vec<NoteId>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT f.note_id FROM note_fulltext f
         JOIN notes n ON n.note_id = f.note_id
         WHERE (f.title LIKE ?1 ESCAPE '\\' OR f.content LIKE ?1 ESCAPE '\\')
           AND n.is_deleted = 0
           AND n.is_protected = 0
           AND NOT EXISTS (
               SELECT 1 FROM labels l
               WHERE l.note_id = f.note_id AND l.name = ?3 AND l.is_deleted = 0
           )
         ORDER BY f.title COLLATE NOCASE, f.note_id
         LIMIT ?2",
    )?;
    let archived = LabelName::archived();
    let ids = stmt
        .query_map(
            params![like_pattern(query), limit as i64, archived.as_str()],
            |row| row.get::<_, NoteId>(0),
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// Rebuilds the whole side table from the note table.
pub fn reindex_all(conn: &Connection) -> StoreResult<ReindexStats> {
    conn.execute("DELETE FROM note_fulltext", [])?;

    let mut stats = ReindexStats::default();
    for id in notes::live_ids(conn)? {
        match update_index(conn, &id)? {
            IndexAction::Removed => stats.skipped += 1,
            _ => stats.indexed += 1,
        }
    }
    log::info!(
        "rebuilt fulltext index: {} indexed, {} skipped",
        stats.indexed,
        stats.skipped
    );
    Ok(stats)
}

/// Number of rows in the side table.
pub fn count(conn: &Connection) -> StoreResult<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM note_fulltext", [], |row| row.get(0))?;
    Ok(n as usize)
}
