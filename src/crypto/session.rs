//! The protected session: holds the data key while unlocked.
//!
//! ```text
//! Locked --unlock--> Unlocking --ok--> Unlocked --lock/expiry--> Locked
//!                        |
//!                        +--wrong password--> Locked
//! ```
//!
//! The key is only reachable through [`ProtectedSession::with_data_key`]; it is
//! never handed out, logged or persisted.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::cipher::DataKey;
use super::errors::{CipherResult, SessionError, SessionResult};
use super::kdf::KeyMaterial;

/// Inactivity after which an unlocked session locks itself.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(600);

/// How often the expiry timer looks at the session.
pub const DEFAULT_EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocking,
    Unlocked,
}

/// Result of a successful [`ProtectedSession::unlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The password verified and the data key is now held.
    Unlocked,
    /// The session was already unlocked; the password was not checked.
    AlreadyUnlocked,
}

enum Slot {
    Locked,
    Unlocking,
    Unlocked {
        key: DataKey,
        last_touched: Instant,
    },
}

struct Inner {
    slot: Slot,
    timeout: Duration,
}

impl Inner {
    fn state(&self) -> SessionState {
        match self.slot {
            Slot::Locked => SessionState::Locked,
            Slot::Unlocking => SessionState::Unlocking,
            Slot::Unlocked { .. } => SessionState::Unlocked,
        }
    }

    /// Drops the key if idle past the timeout. Returns true if it locked.
    fn expire_if_idle(&mut self, now: Instant) -> bool {
        if let Slot::Unlocked { last_touched, .. } = self.slot
            && now.saturating_duration_since(last_touched) > self.timeout
        {
            self.slot = Slot::Locked;
            return true;
        }
        false
    }
}

/// In-memory protected session shared by the whole process.
pub struct ProtectedSession {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ProtectedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("ProtectedSession")
            .field("state", &inner.state())
            .field("timeout", &inner.timeout)
            .finish()
    }
}

impl Default for ProtectedSession {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

impl ProtectedSession {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slot: Slot::Locked,
                timeout,
            }),
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        // The guarded data stays consistent across a panic in a caller's closure.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Verifies the password and takes hold of the data key.
    ///
    /// Key derivation runs without holding the session lock, so readers are
    /// never blocked by a slow unlock.
    ///
    /// # Errors
    ///
    /// - `SessionError::UnlockInProgress` if another unlock is running
    /// - `SessionError::WrongPassword` if the password does not verify
    pub fn unlock(&self, password: &str, material: &KeyMaterial) -> SessionResult<UnlockOutcome> {
        {
            let mut inner = self.lock_inner();
            inner.expire_if_idle(Instant::now());
            match inner.slot {
                Slot::Unlocked { .. } => return Ok(UnlockOutcome::AlreadyUnlocked),
                Slot::Unlocking => return Err(SessionError::UnlockInProgress),
                Slot::Locked => inner.slot = Slot::Unlocking,
            }
        }

        let opened = material.open(password);

        let mut inner = self.lock_inner();
        match opened {
            Ok(key) => {
                inner.slot = Slot::Unlocked {
                    key,
                    last_touched: Instant::now(),
                };
                log::info!("protected session unlocked");
                Ok(UnlockOutcome::Unlocked)
            }
            Err(e) => {
                inner.slot = Slot::Locked;
                log::warn!("protected session unlock failed: {}", e);
                Err(e)
            }
        }
    }

    /// Drops the data key.
    pub fn lock(&self) {
        let mut inner = self.lock_inner();
        if matches!(inner.slot, Slot::Unlocked { .. }) {
            log::info!("protected session locked");
        }
        inner.slot = Slot::Locked;
    }

    /// Resets the inactivity clock.
    pub fn touch(&self) {
        let mut inner = self.lock_inner();
        if let Slot::Unlocked { last_touched, .. } = &mut inner.slot {
            *last_touched = Instant::now();
        }
    }

    /// True while the data key is held and not yet expired.
    pub fn is_unlocked(&self) -> bool {
        let mut inner = self.lock_inner();
        inner.expire_if_idle(Instant::now());
        matches!(inner.slot, Slot::Unlocked { .. })
    }

    /// Current state without applying expiry.
    pub fn state(&self) -> SessionState {
        self.lock_inner().state()
    }

    pub fn timeout(&self) -> Duration {
        self.lock_inner().timeout
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.lock_inner().timeout = timeout;
    }

    /// Locks the session if it has been idle longer than the timeout at `now`.
    ///
    /// Idempotent: calling it again on a locked session does nothing. Returns
    /// true only for the call that actually locked.
    pub fn check_expiry(&self, now: Instant) -> bool {
        let expired = self.lock_inner().expire_if_idle(now);
        if expired {
            log::info!("protected session expired after inactivity");
        }
        expired
    }

    /// Runs `f` with the data key and touches the session on success.
    ///
    /// # Errors
    ///
    /// `SessionError::ProtectedSessionRequired` while locked, or whatever
    /// cipher error `f` returns.
    pub fn with_data_key<T>(&self, f: impl FnOnce(&DataKey) -> CipherResult<T>) -> SessionResult<T> {
        let mut inner = self.lock_inner();
        inner.expire_if_idle(Instant::now());
        match &mut inner.slot {
            Slot::Unlocked { key, last_touched } => {
                let value = f(key)?;
                *last_touched = Instant::now();
                Ok(value)
            }
            _ => Err(SessionError::ProtectedSessionRequired),
        }
    }

    /// Starts a background thread that calls [`check_expiry`](Self::check_expiry)
    /// every `interval`.
    ///
    /// The thread holds only a weak reference and exits when the session is
    /// dropped or the returned timer is stopped.
    pub fn spawn_expiry_timer(self: &Arc<Self>, interval: Duration) -> ExpiryTimer {
        let session: Weak<Self> = Arc::downgrade(self);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("grove-session-expiry".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        _ => break,
                    }
                    let Some(session) = session.upgrade() else {
                        break;
                    };
                    session.check_expiry(Instant::now());
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("failed to start session expiry timer: {}", e);
                None
            }
        };

        ExpiryTimer {
            stop_tx: Some(stop_tx),
            handle,
        }
    }
}

/// Handle to the expiry thread. Stops it on drop.
#[derive(Debug)]
pub struct ExpiryTimer {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    /// Signals the thread and waits for it to finish.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("session expiry timer panicked");
        }
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
