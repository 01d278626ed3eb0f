//! Error types for branch operations.

use crate::domain::{BranchId, NoteId};
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("placing note {note_id} under {parent_note_id} would create a cycle")]
    Cycle {
        note_id: NoteId,
        parent_note_id: NoteId,
    },

    #[error("note {note_id} is already placed under {parent_note_id}")]
    DuplicateBranch {
        note_id: NoteId,
        parent_note_id: NoteId,
    },

    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("the root note cannot be moved, cloned or deleted")]
    RootImmutable,

    #[error("note {parent_note_id} cannot hold children: {reason}")]
    InvalidParent {
        parent_note_id: NoteId,
        reason: String,
    },

    /// The branch is the note's last placement and cascading was not asked for.
    #[error("branch {0} is the last placement of its note; deleting it deletes the note")]
    WouldDeleteNote(BranchId),

    #[error("tree is deeper than {0} levels")]
    TreeTooDeep(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for TreeError {
    fn from(e: rusqlite::Error) -> Self {
        TreeError::Store(StoreError::Database(e))
    }
}

/// Result type alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
