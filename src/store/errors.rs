//! Error types for the row store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row holds a value the store itself would never have written.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
