//! SQLite row store.
//!
//! [`SqliteStore`] owns the connection. The submodules hold row-level
//! functions over a borrowed `Connection`, so callers compose them inside a
//! single [`Transaction`].

pub mod branches;
mod connection;
mod errors;
pub mod labels;
pub mod notes;
pub mod options;
pub mod revisions;
mod schema;
mod transaction;


use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};

pub use errors::{StoreError, StoreResult};
pub use schema::{SCHEMA_VERSION, create_schema};
pub use transaction::Transaction;

/// SQLite-backed store for notes and everything attached to them.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

/// Timestamps are stored as RFC 3339 text.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Reads an RFC 3339 column inside a row-mapping closure.
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
