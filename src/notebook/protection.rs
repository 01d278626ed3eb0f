//! Password, protected session and note protection.

use std::time::Duration;

use super::Notebook;
use crate::crypto::{KeyMaterial, SessionError, SessionState, UnlockOutcome};
use crate::domain::{Note, NoteId};
use crate::error::Result;
use crate::store::options;
use crate::tree::Tree;

impl Notebook {
    // ===========================================
    // Password
    // ===========================================

    pub fn has_password(&self) -> Result<bool> {
        self.read(|conn| Ok(options::key_material(conn)?.is_some()))
    }

    fn key_material(&self) -> Result<KeyMaterial> {
        self.read(|conn| options::key_material(conn)?.ok_or_else(|| SessionError::PasswordNotSet.into()))
    }

    /// Sets the first password, creating the data key.
    ///
    /// Key derivation happens before the store is locked.
    pub fn set_password(&self, password: &str) -> Result<()> {
        if self.has_password()? {
            return Err(SessionError::PasswordAlreadySet.into());
        }
        let material = KeyMaterial::create(password)?;
        self.with_tx(|conn| {
            if options::key_material(conn)?.is_some() {
                return Err(SessionError::PasswordAlreadySet.into());
            }
            options::store_key_material(conn, &material)?;
            Ok(())
        })?;
        log::info!("password set");
        Ok(())
    }

    /// Re-wraps the data key under a new password. Protected notes are not
    /// touched.
    pub fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let material = self.key_material()?;
        let rewrapped = material.rewrap(old_password, new_password)?;
        self.with_tx(|conn| {
            options::store_key_material(conn, &rewrapped)?;
            Ok(())
        })?;
        log::info!("password changed");
        Ok(())
    }

    // ===========================================
    // Session
    // ===========================================

    /// Unlocks the protected session.
    ///
    /// Returns `AlreadyUnlocked` without checking the password when the
    /// session is already unlocked.
    pub fn unlock(&self, password: &str) -> Result<UnlockOutcome> {
        let material = self.key_material()?;
        Ok(self.session.unlock(password, &material)?)
    }

    pub fn lock(&self) {
        self.session.lock();
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Changes the inactivity timeout and persists it.
    pub fn set_session_timeout(&self, timeout: Duration) -> Result<()> {
        self.with_tx(|conn| {
            options::set(
                conn,
                options::PROTECTED_SESSION_TIMEOUT,
                &timeout.as_secs().to_string(),
            )?;
            Ok(())
        })?;
        self.session.set_timeout(timeout);
        Ok(())
    }

    // ===========================================
    // Protecting notes
    // ===========================================

    fn require_unlocked(&self) -> Result<()> {
        if self.session.is_unlocked() {
            Ok(())
        } else {
            Err(SessionError::ProtectedSessionRequired.into())
        }
    }

    /// Protects or unprotects one note and its revisions.
    ///
    /// Needs an unlocked session in both directions.
    pub fn set_protected(&self, id: &NoteId, protected: bool) -> Result<Note> {
        self.require_unlocked()?;
        let note = self.with_tx(|conn| {
            let mut note = self.load_note(conn, id, true)?;
            if note.is_protected() != protected {
                note.set_protected(protected);
                self.write_note(conn, &mut note)?;
            }
            Ok(note)
        })?;
        self.fulltext.enqueue(id.clone());
        log::info!("note {} protected={}", id, protected);
        Ok(note)
    }

    /// Protects or unprotects a note and every live note below it.
    ///
    /// Returns the notes whose protection changed.
    pub fn protect_subtree(&self, id: &NoteId, protected: bool) -> Result<Vec<NoteId>> {
        self.require_unlocked()?;
        let changed = self.with_tx(|conn| {
            let mut changed = Vec::new();
            for note_id in Tree::new(conn).subtree(id)? {
                let mut note = self.load_note(conn, &note_id, true)?;
                if note.is_protected() != protected {
                    note.set_protected(protected);
                    self.write_note(conn, &mut note)?;
                    changed.push(note_id);
                }
            }
            Ok(changed)
        })?;
        self.fulltext.enqueue_all(changed.iter().cloned());
        log::info!(
            "protect_subtree {} protected={}: {} note(s) changed",
            id,
            protected,
            changed.len()
        );
        Ok(changed)
    }
}
