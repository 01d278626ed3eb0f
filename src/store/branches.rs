//! Rows of the `branches` table.
//!
//! Listing functions return live branches only, ordered by position with the
//! branch id as tie-break.

use super::{StoreResult, format_timestamp, timestamp_column};
use crate::domain::{Branch, BranchId, NoteId};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "branch_id, note_id, parent_note_id, position, prefix, is_expanded, is_deleted, date_modified";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Branch> {
    Ok(Branch {
        branch_id: row.get(0)?,
        note_id: row.get(1)?,
        parent_note_id: row.get(2)?,
        position: row.get(3)?,
        prefix: row.get(4)?,
        is_expanded: row.get(5)?,
        is_deleted: row.get(6)?,
        modified: timestamp_column(row, 7)?,
    })
}

fn query(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> StoreResult<Vec<Branch>> {
    let mut stmt = conn.prepare(sql)?;
    let branches = stmt
        .query_map(args, from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(branches)
}

/// Fetches a branch by id, deleted or not.
pub fn get(conn: &Connection, id: &BranchId) -> StoreResult<Option<Branch>> {
    let branch = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM branches WHERE branch_id = ?1"),
            [id],
            from_row,
        )
        .optional()?;
    Ok(branch)
}

pub fn insert(conn: &Connection, branch: &Branch) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO branches ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            branch.branch_id,
            branch.note_id,
            branch.parent_note_id,
            branch.position,
            branch.prefix,
            branch.is_expanded,
            branch.is_deleted,
            format_timestamp(branch.modified),
        ],
    )?;
    Ok(())
}

/// Writes every mutable column of an existing branch.
pub fn update(conn: &Connection, branch: &Branch) -> StoreResult<()> {
    conn.execute(
        "UPDATE branches SET parent_note_id = ?2, position = ?3, prefix = ?4,
             is_expanded = ?5, is_deleted = ?6, date_modified = ?7
         WHERE branch_id = ?1",
        params![
            branch.branch_id,
            branch.parent_note_id,
            branch.position,
            branch.prefix,
            branch.is_expanded,
            branch.is_deleted,
            format_timestamp(branch.modified),
        ],
    )?;
    Ok(())
}

/// Live branches under `parent`.
pub fn live_children(conn: &Connection, parent: &NoteId) -> StoreResult<Vec<Branch>> {
    query(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM branches
             WHERE parent_note_id = ?1 AND is_deleted = 0
             ORDER BY position, branch_id"
        ),
        [parent],
    )
}

/// Live placements of `note`.
pub fn live_placements(conn: &Connection, note: &NoteId) -> StoreResult<Vec<Branch>> {
    query(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM branches
             WHERE note_id = ?1 AND is_deleted = 0
             ORDER BY position, branch_id"
        ),
        [note],
    )
}

/// Parent note ids of the live placements of `note`.
pub fn live_parent_ids(conn: &Connection, note: &NoteId) -> StoreResult<Vec<NoteId>> {
    let mut stmt = conn.prepare(
        "SELECT parent_note_id FROM branches WHERE note_id = ?1 AND is_deleted = 0",
    )?;
    let ids = stmt
        .query_map([note], |row| row.get::<_, NoteId>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// The live branch placing `note` under `parent`, if any.
pub fn find_live(conn: &Connection, parent: &NoteId, note: &NoteId) -> StoreResult<Option<Branch>> {
    let branch = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM branches
                 WHERE parent_note_id = ?1 AND note_id = ?2 AND is_deleted = 0"
            ),
            [parent, note],
            from_row,
        )
        .optional()?;
    Ok(branch)
}

/// Highest position among live children of `parent`.
pub fn max_position(conn: &Connection, parent: &NoteId) -> StoreResult<Option<i64>> {
    let max = conn.query_row(
        "SELECT MAX(position) FROM branches WHERE parent_note_id = ?1 AND is_deleted = 0",
        [parent],
        |row| row.get::<_, Option<i64>>(0),
    )?;
    Ok(max)
}

/// Adds `step` to the position of every live child of `parent` at or after
/// `from` (`inclusive`) or strictly after it.
pub fn shift_positions(
    conn: &Connection,
    parent: &NoteId,
    from: i64,
    inclusive: bool,
    step: i64,
    now: DateTime<Utc>,
) -> StoreResult<usize> {
    let op = if inclusive { ">=" } else { ">" };
    let shifted = conn.execute(
        &format!(
            "UPDATE branches SET position = position + ?3, date_modified = ?4
             WHERE parent_note_id = ?1 AND is_deleted = 0 AND position {op} ?2"
        ),
        params![parent, from, step, format_timestamp(now)],
    )?;
    Ok(shifted)
}

/// Hard-deletes every branch that places `note` or sits under it.
pub fn erase_touching(conn: &Connection, note: &NoteId) -> StoreResult<usize> {
    let erased = conn.execute(
        "DELETE FROM branches WHERE note_id = ?1 OR parent_note_id = ?1",
        [note],
    )?;
    Ok(erased)
}
