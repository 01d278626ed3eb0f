//! Shared building blocks with no notebook semantics.

mod content_hash;

pub use content_hash::{ContentHash, ContentHashError};
