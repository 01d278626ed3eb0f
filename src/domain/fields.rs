//! Title and content of protectable entities, in stored and readable form.

use std::fmt;

/// The kinds of entity whose title and content may be stored encrypted.
///
/// The kind is always known from the table being read, never guessed from the
/// shape of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Note,
    Revision,
}

impl EntityKind {
    /// Table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Note => "notes",
            EntityKind::Revision => "revisions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Note => f.write_str("note"),
            EntityKind::Revision => f.write_str("revision"),
        }
    }
}

/// Title and content exactly as persisted.
///
/// For protected entities the title is base64 ciphertext and the content raw
/// ciphertext; otherwise both are plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredFields {
    pub title: String,
    pub content: Vec<u8>,
}

impl StoredFields {
    pub fn new(title: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

impl fmt::Debug for StoredFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFields")
            .field("title_len", &self.title.len())
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Title shown for protected entities while no protected session is active.
pub const PROTECTED_PLACEHOLDER: &str = "[protected]";

/// Readable title and content of an entity.
///
/// When the entity is protected but could not be decrypted the fields are
/// unavailable: title and content read as placeholders while the sealed form
/// is kept, so the entity can be saved again without touching its ciphertext.
#[derive(Clone, PartialEq)]
pub struct OpenFields {
    title: String,
    content: Vec<u8>,
    available: bool,
    sealed: Option<StoredFields>,
    dirty: bool,
}

impl OpenFields {
    /// New plaintext fields that have never been stored.
    pub fn plain(title: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            available: true,
            sealed: None,
            dirty: true,
        }
    }

    /// Fields read from storage, available in plaintext.
    pub(crate) fn loaded(
        title: impl Into<String>,
        content: impl Into<Vec<u8>>,
        sealed: Option<StoredFields>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            available: true,
            sealed,
            dirty: false,
        }
    }

    /// Fields read from storage that could not be decrypted.
    pub(crate) fn unavailable(sealed: StoredFields) -> Self {
        Self {
            title: PROTECTED_PLACEHOLDER.to_string(),
            content: Vec::new(),
            available: false,
            sealed: Some(sealed),
            dirty: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns false when the plaintext is not available (protected and locked).
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Returns true once title or content changed since loading.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The encrypted form this entity was loaded from, if it was protected.
    pub fn sealed(&self) -> Option<&StoredFields> {
        self.sealed.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.dirty = true;
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
        self.dirty = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Records the freshly written stored form after a successful save.
    pub(crate) fn mark_saved(&mut self, sealed: Option<StoredFields>) {
        self.sealed = sealed;
        self.dirty = false;
    }
}

impl fmt::Debug for OpenFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenFields")
            .field("title", &self.title)
            .field("content_len", &self.content.len())
            .field("available", &self.available)
            .field("sealed", &self.sealed.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}
