//! Crate-level error aggregating the module errors.

use crate::crypto::{CipherError, SessionError};
use crate::domain::NoteId;
use crate::store::StoreError;
use crate::tree::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("could not start background thread: {0}")]
    Thread(#[from] std::io::Error),
}

impl From<CipherError> for Error {
    fn from(e: CipherError) -> Self {
        Error::Session(SessionError::Cipher(e))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Store(StoreError::Database(e))
    }
}

impl Error {
    /// True when the operation needs the protected session to be unlocked.
    pub fn is_protected_session_required(&self) -> bool {
        matches!(self, Error::Session(SessionError::ProtectedSessionRequired))
    }
}

/// Result type alias for notebook operations.
pub type Result<T> = std::result::Result<T, Error>;
