//! Opening the store and seeding a fresh database.

use super::transaction::Transaction;
use super::{SCHEMA_VERSION, SqliteStore, StoreError, StoreResult, create_schema, notes, options};
use crate::domain::{Note, NoteId, NoteType};
use chrono::Utc;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

impl SqliteStore {
    // ===========================================
    // Opening
    // ===========================================

    /// Opens an in-memory store. Used by tests and throwaway notebooks.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Opens or creates a store at `path`, creating parent directories.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        create_schema(&conn)?;
        let mut store = Self { conn };
        store.seed()?;
        Ok(store)
    }

    /// Inserts the root note and default options when missing.
    fn seed(&mut self) -> StoreResult<()> {
        let tx = self.transaction()?;
        let conn = tx.conn();

        if notes::get(conn, &NoteId::root())?.is_none() {
            let root = Note::new(NoteId::root(), "root", Vec::new(), NoteType::Text, Utc::now());
            notes::insert(conn, &notes::NoteRow::plain(&root))?;
            log::debug!("created root note");
        }

        options::init_default(conn, options::SCHEMA_VERSION, &SCHEMA_VERSION.to_string())?;
        options::init_default(
            conn,
            options::PROTECTED_SESSION_TIMEOUT,
            &options::DEFAULT_PROTECTED_SESSION_TIMEOUT_SECS.to_string(),
        )?;

        tx.commit()
    }

    // ===========================================
    // Access
    // ===========================================

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begins an immediate transaction that rolls back on drop.
    pub fn transaction(&mut self) -> StoreResult<Transaction<'_>> {
        Transaction::begin(&self.conn)
    }
}
