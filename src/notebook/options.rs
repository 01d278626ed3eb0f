//! Runtime settings for a [`Notebook`](super::Notebook).

use std::time::Duration;

use crate::crypto::DEFAULT_EXPIRY_CHECK_INTERVAL;
use crate::fulltext::DEFAULT_FULLTEXT_INTERVAL;

/// How a notebook runs its background work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookOptions {
    /// Overrides the persisted protected session timeout for this process.
    pub session_timeout: Option<Duration>,
    /// Interval of the session expiry timer. `None` runs no timer; expiry is
    /// then only applied lazily when the session is used.
    pub expiry_check_interval: Option<Duration>,
    /// Wake-up interval of the fulltext worker. `None` runs no worker;
    /// queued work waits for [`Notebook::flush_fulltext`](super::Notebook::flush_fulltext).
    pub fulltext_interval: Option<Duration>,
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Self {
            session_timeout: None,
            expiry_check_interval: Some(DEFAULT_EXPIRY_CHECK_INTERVAL),
            fulltext_interval: Some(DEFAULT_FULLTEXT_INTERVAL),
        }
    }
}

impl NotebookOptions {
    /// No background threads: fulltext is flushed explicitly.
    pub fn manual() -> Self {
        Self {
            session_timeout: None,
            expiry_check_interval: None,
            fulltext_interval: None,
        }
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }
}
