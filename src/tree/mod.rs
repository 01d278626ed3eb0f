//! The branch DAG: placing, cloning, moving and deleting notes in the tree.
//!
//! A [`Tree`] borrows a connection, normally that of an open
//! [`Transaction`](crate::store::Transaction). Every operation validates
//! before it writes, so a failed call leaves the tree as it was once the
//! transaction is dropped.

mod errors;
mod validation;


use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::domain::{Branch, BranchId, NoteId, POSITION_STEP, normalize_prefix};
use crate::store::{branches, labels, notes};

pub use errors::{TreeError, TreeResult};

/// Ancestor walks give up past this many levels.
pub const MAX_TREE_DEPTH: usize = 1024;

/// What [`Tree::delete_branch`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// False when the branch was already deleted.
    pub branch_deleted: bool,
    /// Notes that lost their last placement, the branch's own note first.
    pub deleted_note_ids: Vec<NoteId>,
}

impl DeleteOutcome {
    pub fn note_deleted(&self) -> bool {
        !self.deleted_note_ids.is_empty()
    }
}

/// Branch operations over one connection.
pub struct Tree<'a> {
    conn: &'a Connection,
    now: DateTime<Utc>,
}

impl<'a> Tree<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            now: Utc::now(),
        }
    }

    // ===========================================
    // Reads
    // ===========================================

    /// Fetches a branch, deleted or not.
    pub fn branch(&self, branch_id: &BranchId) -> TreeResult<Branch> {
        branches::get(self.conn, branch_id)?
            .ok_or_else(|| TreeError::BranchNotFound(branch_id.clone()))
    }

    fn live_branch(&self, branch_id: &BranchId) -> TreeResult<Branch> {
        let branch = self.branch(branch_id)?;
        if branch.is_deleted {
            return Err(TreeError::BranchNotFound(branch_id.clone()));
        }
        Ok(branch)
    }

    /// Live children of `parent`, by position then branch id.
    pub fn children(&self, parent: &NoteId) -> TreeResult<Vec<Branch>> {
        Ok(branches::live_children(self.conn, parent)?)
    }

    /// Live placements of `note_id`.
    pub fn parents(&self, note_id: &NoteId) -> TreeResult<Vec<Branch>> {
        Ok(branches::live_placements(self.conn, note_id)?)
    }

    /// `root` and every live note below it, each once, parents before children.
    pub fn subtree(&self, root: &NoteId) -> TreeResult<Vec<NoteId>> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::from([root.clone()]);
        seen.insert(root.clone());

        while let Some(id) = queue.pop_front() {
            for child in branches::live_children(self.conn, &id)? {
                if seen.insert(child.note_id.clone()) {
                    queue.push_back(child.note_id);
                }
            }
            order.push(id);
        }
        Ok(order)
    }

    // ===========================================
    // Placement
    // ===========================================

    /// Places `note_id` as the last child of `parent_note_id`.
    ///
    /// Used both for a new note's first branch and for cloning an existing
    /// note under another parent.
    pub fn create_branch(
        &self,
        note_id: &NoteId,
        parent_note_id: &NoteId,
        prefix: Option<&str>,
    ) -> TreeResult<Branch> {
        self.validate_placement(note_id, parent_note_id, None)?;

        let position = self.next_position(parent_note_id)?;
        let branch = Branch::new(note_id.clone(), parent_note_id.clone(), position, prefix, self.now);
        branches::insert(self.conn, &branch)?;

        log::info!(
            "placed note {} under {} at {} (branch {})",
            note_id,
            parent_note_id,
            position,
            branch.branch_id
        );
        Ok(branch)
    }

    /// Clones `note_id` into the parent of `after_branch_id`, right after it.
    pub fn clone_after(
        &self,
        note_id: &NoteId,
        after_branch_id: &BranchId,
        prefix: Option<&str>,
    ) -> TreeResult<Branch> {
        let after = self.live_branch(after_branch_id)?;
        self.validate_placement(note_id, &after.parent_note_id, None)?;

        branches::shift_positions(
            self.conn,
            &after.parent_note_id,
            after.position,
            false,
            POSITION_STEP,
            self.now,
        )?;

        let branch = Branch::new(
            note_id.clone(),
            after.parent_note_id.clone(),
            after.position + POSITION_STEP,
            prefix,
            self.now,
        );
        branches::insert(self.conn, &branch)?;

        log::info!(
            "cloned note {} under {} after branch {}",
            note_id,
            after.parent_note_id,
            after_branch_id
        );
        Ok(branch)
    }

    fn next_position(&self, parent: &NoteId) -> TreeResult<i64> {
        Ok(branches::max_position(self.conn, parent)?.unwrap_or(0) + POSITION_STEP)
    }

    // ===========================================
    // Moves
    // ===========================================

    /// Moves a branch to just before `before_branch_id`, taking its position.
    pub fn move_before(&self, branch_id: &BranchId, before_branch_id: &BranchId) -> TreeResult<Branch> {
        let mut moved = self.live_branch(branch_id)?;
        let before = self.live_branch(before_branch_id)?;
        if moved.branch_id == before.branch_id {
            return Ok(moved);
        }
        self.validate_placement(&moved.note_id, &before.parent_note_id, Some(&moved.branch_id))?;

        branches::shift_positions(
            self.conn,
            &before.parent_note_id,
            before.position,
            true,
            POSITION_STEP,
            self.now,
        )?;

        moved.parent_note_id = before.parent_note_id.clone();
        moved.position = before.position;
        moved.modified = self.now;
        branches::update(self.conn, &moved)?;

        log::info!(
            "moved branch {} before {} under {}",
            branch_id,
            before_branch_id,
            moved.parent_note_id
        );
        Ok(moved)
    }

    /// Moves a branch to just after `after_branch_id`.
    pub fn move_after(&self, branch_id: &BranchId, after_branch_id: &BranchId) -> TreeResult<Branch> {
        let mut moved = self.live_branch(branch_id)?;
        let after = self.live_branch(after_branch_id)?;
        if moved.branch_id == after.branch_id {
            return Ok(moved);
        }
        self.validate_placement(&moved.note_id, &after.parent_note_id, Some(&moved.branch_id))?;

        branches::shift_positions(
            self.conn,
            &after.parent_note_id,
            after.position,
            false,
            POSITION_STEP,
            self.now,
        )?;

        moved.parent_note_id = after.parent_note_id.clone();
        moved.position = after.position + POSITION_STEP;
        moved.modified = self.now;
        branches::update(self.conn, &moved)?;

        log::info!(
            "moved branch {} after {} under {}",
            branch_id,
            after_branch_id,
            moved.parent_note_id
        );
        Ok(moved)
    }

    /// Moves a branch to the end of `new_parent`'s children.
    pub fn move_to_parent(&self, branch_id: &BranchId, new_parent: &NoteId) -> TreeResult<Branch> {
        let mut moved = self.live_branch(branch_id)?;
        self.validate_placement(&moved.note_id, new_parent, Some(&moved.branch_id))?;

        moved.position = self.next_position(new_parent)?;
        moved.parent_note_id = new_parent.clone();
        moved.modified = self.now;
        branches::update(self.conn, &moved)?;

        log::info!("moved branch {} under {}", branch_id, new_parent);
        Ok(moved)
    }

    // ===========================================
    // Deletion
    // ===========================================

    /// Soft-deletes a branch.
    ///
    /// Deleting a note's last placement deletes the note. That only happens
    /// with `cascade`; it then walks the subtree and deletes every
    /// descendant left without a live placement. Repeating the call on an
    /// already deleted branch does nothing.
    pub fn delete_branch(&self, branch_id: &BranchId, cascade: bool) -> TreeResult<DeleteOutcome> {
        let mut branch = self.branch(branch_id)?;
        if branch.is_deleted {
            return Ok(DeleteOutcome::default());
        }
        if branch.note_id.is_root() {
            return Err(TreeError::RootImmutable);
        }

        let placements = branches::live_placements(self.conn, &branch.note_id)?;
        let last_placement = placements.iter().all(|b| b.branch_id == branch.branch_id);
        if last_placement && !cascade {
            return Err(TreeError::WouldDeleteNote(branch_id.clone()));
        }

        branch.is_deleted = true;
        branch.modified = self.now;
        branches::update(self.conn, &branch)?;

        let mut outcome = DeleteOutcome {
            branch_deleted: true,
            deleted_note_ids: Vec::new(),
        };
        if !last_placement {
            log::info!("deleted branch {}; note {} keeps other placements", branch_id, branch.note_id);
            return Ok(outcome);
        }

        let mut stack = vec![branch.note_id.clone()];
        self.delete_note_row(&branch.note_id)?;
        outcome.deleted_note_ids.push(branch.note_id.clone());

        while let Some(note_id) = stack.pop() {
            for mut child in branches::live_children(self.conn, &note_id)? {
                child.is_deleted = true;
                child.modified = self.now;
                branches::update(self.conn, &child)?;

                if branches::live_placements(self.conn, &child.note_id)?.is_empty() {
                    self.delete_note_row(&child.note_id)?;
                    outcome.deleted_note_ids.push(child.note_id.clone());
                    stack.push(child.note_id);
                }
            }
        }

        log::info!(
            "deleted branch {} and {} note(s)",
            branch_id,
            outcome.deleted_note_ids.len()
        );
        Ok(outcome)
    }

    fn delete_note_row(&self, note_id: &NoteId) -> TreeResult<()> {
        notes::set_deleted(self.conn, note_id, true, self.now)?;
        labels::remove_all(self.conn, note_id)?;
        Ok(())
    }

    // ===========================================
    // Branch attributes
    // ===========================================

    /// Sets or clears the prefix shown before the note title in this placement.
    pub fn set_prefix(&self, branch_id: &BranchId, prefix: Option<&str>) -> TreeResult<Branch> {
        let mut branch = self.live_branch(branch_id)?;
        branch.prefix = normalize_prefix(prefix);
        branch.modified = self.now;
        branches::update(self.conn, &branch)?;
        Ok(branch)
    }

    pub fn set_expanded(&self, branch_id: &BranchId, expanded: bool) -> TreeResult<Branch> {
        let mut branch = self.live_branch(branch_id)?;
        branch.is_expanded = expanded;
        branch.modified = self.now;
        branches::update(self.conn, &branch)?;
        Ok(branch)
    }

    /// Renumbers the children of `parent` 10, 20, 30... in order of the key
    /// `sort_key` returns for each child note (ties keep branch order).
    pub fn sort_children_by<K: Ord>(
        &self,
        parent: &NoteId,
        mut sort_key: impl FnMut(&NoteId) -> TreeResult<K>,
    ) -> TreeResult<Vec<Branch>> {
        let mut keyed = Vec::new();
        for branch in branches::live_children(self.conn, parent)? {
            keyed.push((sort_key(&branch.note_id)?, branch));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut sorted = Vec::with_capacity(keyed.len());
        for (i, (_, mut branch)) in keyed.into_iter().enumerate() {
            let position = (i as i64 + 1) * POSITION_STEP;
            if branch.position != position {
                branch.position = position;
                branch.modified = self.now;
                branches::update(self.conn, &branch)?;
            }
            sorted.push(branch);
        }

        log::info!("sorted {} children of {}", sorted.len(), parent);
        Ok(sorted)
    }
}
