//! In-memory queue of notes whose index row may be stale.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::index;
use crate::domain::NoteId;
use crate::store::SqliteStore;

#[derive(Default)]
struct QueueState {
    order: VecDeque<NoteId>,
    pending: HashSet<NoteId>,
    shutdown: bool,
}

/// FIFO of note ids, each present at most once.
///
/// A job reads the note as it is when the job runs, so several edits to a
/// note queued before the job runs collapse into one reindex of the final
/// state.
#[derive(Default)]
pub struct FulltextQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
    processed: AtomicU64,
}

impl std::fmt::Debug for FulltextQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FulltextQueue")
            .field("pending", &self.len())
            .field("processed", &self.processed())
            .finish()
    }
}

impl FulltextQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a note. Returns false if it was already pending.
    pub fn enqueue(&self, note_id: NoteId) -> bool {
        let mut state = self.lock_state();
        if !state.pending.insert(note_id.clone()) {
            return false;
        }
        state.order.push_back(note_id);
        drop(state);
        self.ready.notify_one();
        true
    }

    pub fn enqueue_all(&self, note_ids: impl IntoIterator<Item = NoteId>) {
        for id in note_ids {
            self.enqueue(id);
        }
    }

    pub fn len(&self) -> usize {
        self.lock_state().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Jobs run since the queue was created.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    fn take_next(&self) -> Option<NoteId> {
        let mut state = self.lock_state();
        let id = state.order.pop_front()?;
        state.pending.remove(&id);
        Some(id)
    }

    /// Runs every pending job in order. Returns how many ran.
    ///
    /// A failing job is logged and the note's row removed, so the index never
    /// holds stale text for it; the remaining jobs still run.
    pub fn process_pending(&self, store: &Mutex<SqliteStore>) -> usize {
        let mut ran = 0;
        while let Some(note_id) = self.take_next() {
            let store = store.lock().unwrap_or_else(PoisonError::into_inner);
            match index::update_index(store.conn(), &note_id) {
                Ok(action) => log::debug!("fulltext {}: {:?}", note_id, action),
                Err(e) => {
                    log::warn!("fulltext update failed for {}: {}", note_id, e);
                    if let Err(e) = index::remove(store.conn(), &note_id) {
                        log::warn!("could not drop fulltext row for {}: {}", note_id, e);
                    }
                }
            }
            ran += 1;
            self.processed.fetch_add(1, Ordering::Relaxed);
        }
        ran
    }

    /// Blocks until work is queued, `timeout` passes or shutdown is signalled.
    /// Returns false once shut down.
    pub(crate) fn wait_for_work(&self, timeout: Duration) -> bool {
        let state = self.lock_state();
        let (state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |s| s.order.is_empty() && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        !state.shutdown
    }

    pub(crate) fn shutdown(&self) {
        self.lock_state().shutdown = true;
        self.ready.notify_all();
    }
}
