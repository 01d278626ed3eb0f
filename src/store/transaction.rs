//! RAII transaction over the store connection.

use super::StoreResult;
use rusqlite::Connection;

/// An open `BEGIN IMMEDIATE` transaction.
///
/// Rolls back on drop unless [`commit`](Self::commit) was called, so an early
/// `?` return leaves the database untouched.
pub struct Transaction<'a> {
    conn: &'a Connection,
    finished: bool,
}

impl<'a> Transaction<'a> {
    /// Takes the write lock up front; readers on other connections proceed.
    pub(crate) fn begin(conn: &'a Connection) -> StoreResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    pub fn commit(mut self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    pub fn rollback(mut self) -> StoreResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished && self.conn.execute_batch("ROLLBACK").is_err() {
            log::warn!("rollback on drop failed");
        }
    }
}
