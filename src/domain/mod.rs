//! Core types: Note, Branch, Revision, Label and their identifiers

mod branch;
mod fields;
mod id;
mod label;
mod note;
mod revision;

pub use branch::{Branch, POSITION_STEP, normalize_prefix};
pub use fields::{EntityKind, OpenFields, PROTECTED_PLACEHOLDER, StoredFields};
pub use id::{BranchId, MAX_ID_LEN, NoteId, ParseIdError, RevisionId};
pub use label::{ARCHIVED_LABEL, Label, LabelName, ParseLabelError};
pub use note::{Note, NoteType, ParseNoteTypeError};
pub use revision::Revision;
