//! Branch: one placement of a note under a parent note.

use crate::domain::{BranchId, NoteId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Distance between neighbouring sibling positions.
///
/// Leaving gaps lets a note be slotted between two siblings by shifting only
/// the siblings after it.
pub const POSITION_STEP: i64 = 10;

/// A placement of `note_id` under `parent_note_id`.
///
/// A note with more than one live branch is a clone: the same note shown under
/// several parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: BranchId,
    pub note_id: NoteId,
    pub parent_note_id: NoteId,
    pub position: i64,
    pub prefix: Option<String>,
    pub is_expanded: bool,
    pub is_deleted: bool,
    pub modified: DateTime<Utc>,
}

impl Branch {
    /// Creates a live, collapsed branch with a fresh id.
    pub fn new(
        note_id: NoteId,
        parent_note_id: NoteId,
        position: i64,
        prefix: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            branch_id: BranchId::generate(),
            note_id,
            parent_note_id,
            position,
            prefix: normalize_prefix(prefix),
            is_expanded: false,
            is_deleted: false,
            modified: now,
        }
    }
}

/// Blank prefixes are stored as no prefix at all.
pub fn normalize_prefix(prefix: Option<&str>) -> Option<String> {
    prefix
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prefix_becomes_none() {
        assert_eq!(normalize_prefix(Some("   ")), None);
        assert_eq!(normalize_prefix(None), None);
        assert_eq!(normalize_prefix(Some(" draft ")), Some("draft".to_string()));
    }

    #[test]
    fn new_branch_is_live_and_collapsed() {
        let b = Branch::new(
            "child".parse().unwrap(),
            NoteId::root(),
            10,
            Some(""),
            Utc::now(),
        );
        assert!(!b.is_deleted);
        assert!(!b.is_expanded);
        assert_eq!(b.prefix, None);
        assert_eq!(b.position, 10);
    }
}
