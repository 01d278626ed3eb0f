//! The operation surface: notes, branches, protection and search behind one
//! handle.
//!
//! A [`Notebook`] owns the store connection, the protected session, the entity
//! codec and the fulltext queue. Every mutating call runs in a single
//! transaction; fulltext work is queued after commit and applied by the
//! worker (or by [`Notebook::flush_fulltext`]).

mod branches;
mod notes;
mod options;
mod protection;
mod search;


use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::Connection;

use crate::crypto::{EntityCodec, ExpiryTimer, ProtectedSession};
use crate::error::Result;
use crate::fulltext::{FulltextQueue, FulltextWorker};
use crate::store::{SqliteStore, options as store_options};

pub use notes::NewNoteOptions;
pub use options::NotebookOptions;

/// A note store with its protected session and fulltext index.
pub struct Notebook {
    store: Arc<Mutex<SqliteStore>>,
    session: Arc<ProtectedSession>,
    codec: EntityCodec,
    fulltext: Arc<FulltextQueue>,
    worker: Option<FulltextWorker>,
    expiry_timer: Option<ExpiryTimer>,
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notebook")
            .field("session", &self.session)
            .field("fulltext", &self.fulltext)
            .field("worker", &self.worker.is_some())
            .finish()
    }
}

impl Notebook {
    // ===========================================
    // Opening
    // ===========================================

    /// Opens or creates the notebook database at `path`.
    pub fn open(path: &Path, options: NotebookOptions) -> Result<Self> {
        Self::with_store(SqliteStore::open(path)?, options)
    }

    pub fn open_in_memory(options: NotebookOptions) -> Result<Self> {
        Self::with_store(SqliteStore::open_in_memory()?, options)
    }

    fn with_store(store: SqliteStore, options: NotebookOptions) -> Result<Self> {
        let timeout = match options.session_timeout {
            Some(timeout) => timeout,
            None => Duration::from_secs(store_options::session_timeout_secs(store.conn())?),
        };

        let store = Arc::new(Mutex::new(store));
        let session = Arc::new(ProtectedSession::new(timeout));
        let fulltext = Arc::new(FulltextQueue::new());

        let expiry_timer = options
            .expiry_check_interval
            .map(|interval| session.spawn_expiry_timer(interval));
        let worker = match options.fulltext_interval {
            Some(interval) => Some(FulltextWorker::spawn(
                Arc::clone(&fulltext),
                Arc::clone(&store),
                interval,
            )?),
            None => None,
        };

        log::debug!("opened notebook, session timeout {:?}", timeout);
        Ok(Self {
            store,
            codec: EntityCodec::new(Arc::clone(&session)),
            session,
            fulltext,
            worker,
            expiry_timer,
        })
    }

    // ===========================================
    // Internals
    // ===========================================

    fn lock_store(&self) -> MutexGuard<'_, SqliteStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` in one transaction, committing only if it succeeds.
    fn with_tx<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut store = self.lock_store();
        let tx = store.transaction()?;
        let value = f(tx.conn())?;
        tx.commit()?;
        Ok(value)
    }

    /// Runs `f` against the connection without a transaction.
    fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let store = self.lock_store();
        f(store.conn())
    }

    /// The shared protected session.
    pub fn session(&self) -> &Arc<ProtectedSession> {
        &self.session
    }

    pub fn fulltext_queue(&self) -> &Arc<FulltextQueue> {
        &self.fulltext
    }

    /// Stops the background threads. Also happens on drop.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        if let Some(mut timer) = self.expiry_timer.take() {
            timer.stop();
        }
    }
}

impl Drop for Notebook {
    fn drop(&mut self) {
        self.shutdown();
    }
}
