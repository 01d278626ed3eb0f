//! Converts protectable entities between their stored and readable forms.

use std::sync::Arc;

use super::cipher::{self, FIELD_VERIFICATION_BYTES};
use super::errors::{SessionError, SessionResult};
use super::session::ProtectedSession;
use crate::domain::{EntityKind, OpenFields, StoredFields};

/// Encodes and decodes the title and content of notes and revisions.
#[derive(Debug, Clone)]
pub struct EntityCodec {
    session: Arc<ProtectedSession>,
}

impl EntityCodec {
    pub fn new(session: Arc<ProtectedSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<ProtectedSession> {
        &self.session
    }

    /// Decodes stored fields.
    ///
    /// Unprotected entities pass through. Protected entities are decrypted
    /// while the session is unlocked and come back unavailable otherwise.
    ///
    /// # Errors
    ///
    /// A cipher error if the stored ciphertext does not decrypt under the
    /// current data key.
    pub fn decode(
        &self,
        kind: EntityKind,
        is_protected: bool,
        stored: StoredFields,
    ) -> SessionResult<OpenFields> {
        if !is_protected {
            return Ok(OpenFields::loaded(stored.title, stored.content, None));
        }

        let opened = self.session.with_data_key(|key| {
            let title = if stored.title.is_empty() {
                String::new()
            } else {
                cipher::decrypt_string(key, &stored.title)?
            };
            let content = if stored.content.is_empty() {
                Vec::new()
            } else {
                cipher::decrypt(key, &stored.content, FIELD_VERIFICATION_BYTES)?
            };
            Ok((title, content))
        });

        match opened {
            Ok((title, content)) => Ok(OpenFields::loaded(title, content, Some(stored))),
            Err(SessionError::ProtectedSessionRequired) => Ok(OpenFields::unavailable(stored)),
            Err(e) => {
                log::debug!("failed to decrypt {}: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Like [`decode`](Self::decode), for batch reads: a decryption failure is
    /// logged and the entity comes back unavailable.
    pub fn decode_lenient(
        &self,
        kind: EntityKind,
        entity_id: &str,
        is_protected: bool,
        stored: StoredFields,
    ) -> OpenFields {
        match self.decode(kind, is_protected, stored.clone()) {
            Ok(fields) => fields,
            Err(e) => {
                log::error!("could not decrypt {} {}: {}", kind, entity_id, e);
                OpenFields::unavailable(stored)
            }
        }
    }

    /// Produces the form to persist.
    ///
    /// A protected entity whose fields are unchanged since loading re-emits its
    /// sealed form untouched, so it can be saved while the session is locked.
    ///
    /// # Errors
    ///
    /// `SessionError::ProtectedSessionRequired` when new ciphertext is needed
    /// while locked, or when the fields are unavailable and were modified.
    pub fn encode(
        &self,
        kind: EntityKind,
        is_protected: bool,
        open: &OpenFields,
    ) -> SessionResult<StoredFields> {
        if !open.is_available() {
            return match open.sealed() {
                Some(sealed) if is_protected && !open.is_dirty() => Ok(sealed.clone()),
                _ => {
                    log::debug!("refusing to encode unavailable {}", kind);
                    Err(SessionError::ProtectedSessionRequired)
                }
            };
        }

        if !is_protected {
            return Ok(StoredFields::new(open.title(), open.content()));
        }

        if !open.is_dirty()
            && let Some(sealed) = open.sealed()
        {
            return Ok(sealed.clone());
        }

        self.session.with_data_key(|key| {
            Ok(StoredFields::new(
                cipher::encrypt_string(key, open.title())?,
                cipher::encrypt(key, open.content())?,
            ))
        })
    }
}
