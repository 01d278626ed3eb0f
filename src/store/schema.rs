//! SQLite schema for notes, branches, revisions, labels, options and the
//! fulltext side table.

use rusqlite::Connection;

/// Written to the `schemaVersion` option on creation.
pub const SCHEMA_VERSION: i64 = 1;

/// Creates all tables and indexes. Idempotent.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // ===========================================
    // Notes
    // ===========================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS notes (
            note_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content BLOB NOT NULL,
            type TEXT NOT NULL,
            mime TEXT NOT NULL,
            is_protected INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            date_created TEXT NOT NULL,
            date_modified TEXT NOT NULL
        );",
    )?;

    // ===========================================
    // Branches
    // ===========================================
    // The partial unique index is the last line of defence for
    // "at most one live placement per (parent, note)".
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS branches (
            branch_id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(note_id),
            parent_note_id TEXT NOT NULL REFERENCES notes(note_id),
            position INTEGER NOT NULL,
            prefix TEXT,
            is_expanded INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            date_modified TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_branches_live_placement
            ON branches(parent_note_id, note_id) WHERE is_deleted = 0;
        CREATE INDEX IF NOT EXISTS idx_branches_note ON branches(note_id);
        CREATE INDEX IF NOT EXISTS idx_branches_parent ON branches(parent_note_id, position);",
    )?;

    // ===========================================
    // Revisions and labels
    // ===========================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS revisions (
            revision_id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(note_id),
            title TEXT NOT NULL,
            content BLOB NOT NULL,
            is_protected INTEGER NOT NULL DEFAULT 0,
            date_created TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_revisions_note ON revisions(note_id);

        CREATE TABLE IF NOT EXISTS labels (
            note_id TEXT NOT NULL REFERENCES notes(note_id),
            name TEXT NOT NULL,
            value TEXT NOT NULL DEFAULT '',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (note_id, name)
        );",
    )?;

    // ===========================================
    // Fulltext side table and options
    // ===========================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS note_fulltext (
            note_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            title_hash TEXT NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS options (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?",
            [name],
            |_| Ok(()),
        )
        .is_ok()
    }

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        for table in [
            "notes",
            "branches",
            "revisions",
            "labels",
            "note_fulltext",
            "options",
        ] {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
    }

    #[test]
    fn is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        create_schema(&conn).unwrap();
    }

    #[test]
    fn live_placement_index_allows_deleted_duplicates() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO notes VALUES ('p', 't', x'', 'text', 'text/html', 0, 0, 'd', 'd');
             INSERT INTO notes VALUES ('c', 't', x'', 'text', 'text/html', 0, 0, 'd', 'd');
             INSERT INTO branches VALUES ('b1', 'c', 'p', 10, NULL, 0, 1, 'd');
             INSERT INTO branches VALUES ('b2', 'c', 'p', 10, NULL, 0, 0, 'd');",
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO branches VALUES ('b3', 'c', 'p', 20, NULL, 0, 0, 'd')",
            [],
        );
        assert!(dup.is_err());
    }
}
