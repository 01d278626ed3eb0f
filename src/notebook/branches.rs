//! Branch operations. Each runs in one transaction through [`Tree`].

use super::Notebook;
use crate::domain::{Branch, BranchId, EntityKind, NoteId};
use crate::error::Result;
use crate::fulltext::index;
use crate::store::notes;
use crate::tree::{DeleteOutcome, Tree};

impl Notebook {
    /// Places an existing note under another parent as well.
    pub fn clone_note(&self, note_id: &NoteId, parent: &NoteId, prefix: Option<&str>) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).create_branch(note_id, parent, prefix)?))
    }

    /// Clones a note right after an existing branch.
    pub fn clone_after(
        &self,
        note_id: &NoteId,
        after_branch_id: &BranchId,
        prefix: Option<&str>,
    ) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).clone_after(note_id, after_branch_id, prefix)?))
    }

    pub fn move_before(&self, branch_id: &BranchId, before_branch_id: &BranchId) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).move_before(branch_id, before_branch_id)?))
    }

    pub fn move_after(&self, branch_id: &BranchId, after_branch_id: &BranchId) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).move_after(branch_id, after_branch_id)?))
    }

    pub fn move_to_parent(&self, branch_id: &BranchId, new_parent: &NoteId) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).move_to_parent(branch_id, new_parent)?))
    }

    /// Deletes a branch; see [`Tree::delete_branch`]. Notes that became
    /// deleted lose their index rows in the same transaction.
    pub fn delete_branch(&self, branch_id: &BranchId, cascade: bool) -> Result<DeleteOutcome> {
        let outcome = self.with_tx(|conn| {
            let outcome = Tree::new(conn).delete_branch(branch_id, cascade)?;
            for id in &outcome.deleted_note_ids {
                index::remove(conn, id)?;
            }
            Ok(outcome)
        })?;
        self.fulltext.enqueue_all(outcome.deleted_note_ids.iter().cloned());
        Ok(outcome)
    }

    pub fn set_prefix(&self, branch_id: &BranchId, prefix: Option<&str>) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).set_prefix(branch_id, prefix)?))
    }

    pub fn set_expanded(&self, branch_id: &BranchId, expanded: bool) -> Result<Branch> {
        self.with_tx(|conn| Ok(Tree::new(conn).set_expanded(branch_id, expanded)?))
    }

    pub fn branch(&self, branch_id: &BranchId) -> Result<Branch> {
        self.read(|conn| Ok(Tree::new(conn).branch(branch_id)?))
    }

    /// Live child branches of `parent`, in order.
    pub fn children(&self, parent: &NoteId) -> Result<Vec<Branch>> {
        self.read(|conn| Ok(Tree::new(conn).children(parent)?))
    }

    /// Live placements of a note.
    pub fn parents(&self, note_id: &NoteId) -> Result<Vec<Branch>> {
        self.read(|conn| Ok(Tree::new(conn).parents(note_id)?))
    }

    /// Orders the children of `parent` by title, case-insensitively.
    ///
    /// Protected notes sort by their real title while unlocked and by the
    /// placeholder otherwise.
    pub fn sort_children(&self, parent: &NoteId) -> Result<Vec<Branch>> {
        self.with_tx(|conn| {
            let sorted = Tree::new(conn).sort_children_by(parent, |id| {
                let title = match notes::get(conn, id)? {
                    Some(row) => self
                        .codec
                        .decode_lenient(EntityKind::Note, id.as_str(), row.is_protected, row.stored)
                        .title()
                        .to_lowercase(),
                    None => String::new(),
                };
                Ok(title)
            })?;
            Ok(sorted)
        })
    }
}
