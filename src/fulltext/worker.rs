//! Background thread draining the fulltext queue.

use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::queue::FulltextQueue;
use crate::store::SqliteStore;

/// Default wait between drains when nothing wakes the worker.
pub const DEFAULT_FULLTEXT_INTERVAL: Duration = Duration::from_millis(500);

/// Owns the worker thread. Stops it on drop.
///
/// Jobs still queued at shutdown are abandoned; `reindex_all` rebuilds
/// whatever they would have written.
#[derive(Debug)]
pub struct FulltextWorker {
    queue: Arc<FulltextQueue>,
    handle: Option<JoinHandle<()>>,
}

impl FulltextWorker {
    pub fn spawn(
        queue: Arc<FulltextQueue>,
        store: Arc<Mutex<SqliteStore>>,
        interval: Duration,
    ) -> io::Result<Self> {
        let worker_queue = Arc::clone(&queue);
        let handle = thread::Builder::new()
            .name("grove-fulltext".to_string())
            .spawn(move || {
                while worker_queue.wait_for_work(interval) {
                    let ran = worker_queue.process_pending(&store);
                    if ran > 0 {
                        log::debug!("fulltext worker ran {} job(s)", ran);
                    }
                }
                log::debug!("fulltext worker stopped");
            })?;

        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Signals the thread and waits for it to exit.
    pub fn shutdown(&mut self) {
        self.queue.shutdown();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("fulltext worker panicked");
        }
    }
}

impl Drop for FulltextWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
