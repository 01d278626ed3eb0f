//! String identifiers for notes, branches and revisions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Longest identifier accepted when parsing.
pub const MAX_ID_LEN: usize = 64;

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone)]
pub struct ParseIdError {
    value: String,
    reason: &'static str,
}

impl ParseIdError {
    /// Returns the invalid value that caused this error.
    pub fn invalid_value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid identifier '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

fn validate(s: &str) -> Result<(), ParseIdError> {
    let reason = if s.is_empty() {
        "must not be empty"
    } else if s.len() > MAX_ID_LEN {
        "too long"
    } else if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        "only ASCII letters, digits and '_' are allowed"
    } else {
        return Ok(());
    };

    Err(ParseIdError {
        value: s.to_string(),
        reason,
    })
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh, time-ordered identifier.
            pub fn generate() -> Self {
                Self(Ulid::new().to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(\"{}\")", stringify!($name), self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                let s = value.as_str()?;
                s.parse()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

entity_id!(
    /// Identifies a note. The well-known id `root` names the tree root.
    NoteId
);

entity_id!(
    /// Identifies one placement of a note under a parent.
    BranchId
);

entity_id!(
    /// Identifies a stored snapshot of a note.
    RevisionId
);

impl NoteId {
    /// Id of the note every tree hangs from.
    pub const ROOT: &'static str = "root";

    /// Returns the root note's id.
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Returns true for the root note.
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// Returns the first 10 characters, enough to tell notes apart in listings.
    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(10)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}
