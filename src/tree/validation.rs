//! Checks run before any branch is created or re-parented.

use std::collections::HashSet;

use super::{MAX_TREE_DEPTH, Tree, TreeError, TreeResult};
use crate::domain::{BranchId, NoteId};
use crate::store::{branches, notes};

impl Tree<'_> {
    /// Validates placing `note_id` under `parent_note_id`.
    ///
    /// `moving` is the branch being re-parented, if any; it does not count as
    /// a duplicate of itself.
    pub(crate) fn validate_placement(
        &self,
        note_id: &NoteId,
        parent_note_id: &NoteId,
        moving: Option<&BranchId>,
    ) -> TreeResult<()> {
        if note_id.is_root() {
            return Err(TreeError::RootImmutable);
        }

        match notes::get(self.conn, note_id)? {
            Some(note) if !note.is_deleted => {}
            _ => return Err(TreeError::NoteNotFound(note_id.clone())),
        }

        let parent = match notes::get(self.conn, parent_note_id)? {
            Some(parent) => parent,
            None => return Err(TreeError::NoteNotFound(parent_note_id.clone())),
        };
        if parent.is_deleted {
            return Err(TreeError::InvalidParent {
                parent_note_id: parent_note_id.clone(),
                reason: "parent is deleted".to_string(),
            });
        }
        if !parent.note_type.accepts_children() {
            return Err(TreeError::InvalidParent {
                parent_note_id: parent_note_id.clone(),
                reason: format!("{} notes cannot have children", parent.note_type),
            });
        }

        if let Some(existing) = branches::find_live(self.conn, parent_note_id, note_id)?
            && Some(&existing.branch_id) != moving
        {
            return Err(TreeError::DuplicateBranch {
                note_id: note_id.clone(),
                parent_note_id: parent_note_id.clone(),
            });
        }

        if self.is_ancestor_or_self(note_id, parent_note_id)? {
            return Err(TreeError::Cycle {
                note_id: note_id.clone(),
                parent_note_id: parent_note_id.clone(),
            });
        }

        Ok(())
    }

    /// True if `candidate` is `note_id` itself or one of its live ancestors.
    ///
    /// Walks parents breadth-first with a visited set. Fails closed with
    /// `TreeTooDeep` past [`MAX_TREE_DEPTH`] levels.
    pub fn is_ancestor_or_self(&self, candidate: &NoteId, note_id: &NoteId) -> TreeResult<bool> {
        if candidate == note_id {
            return Ok(true);
        }

        let mut visited: HashSet<NoteId> = HashSet::new();
        let mut level = vec![note_id.clone()];
        visited.insert(note_id.clone());

        for _ in 0..MAX_TREE_DEPTH {
            let mut next = Vec::new();
            for id in &level {
                for parent in branches::live_parent_ids(self.conn, id)? {
                    if &parent == candidate {
                        return Ok(true);
                    }
                    if visited.insert(parent.clone()) {
                        next.push(parent);
                    }
                }
            }
            if next.is_empty() {
                return Ok(false);
            }
            level = next;
        }

        Err(TreeError::TreeTooDeep(MAX_TREE_DEPTH))
    }
}
