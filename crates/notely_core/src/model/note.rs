//! Note domain model.
//!
//! # Responsibility
//! - Define the note record exchanged with the remote note store.
//! - Normalize server-assigned identifiers into one opaque shape.
//!
//! # Invariants
//! - `id` is assigned by the remote store and never changes afterwards.
//! - `important` is the only field a client mutates after creation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque server-assigned note identifier.
///
/// The wire value may be a JSON string or integer; both are kept in their
/// textual form so comparisons stay stable across backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawNoteId", into = "String")]
pub struct NoteId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNoteId {
    Text(String),
    Integer(i64),
}

impl From<RawNoteId> for NoteId {
    fn from(value: RawNoteId) -> Self {
        match value {
            RawNoteId::Text(text) => Self(text),
            RawNoteId::Integer(number) => Self(number.to_string()),
        }
    }
}

impl From<NoteId> for String {
    fn from(value: NoteId) -> Self {
        value.0
    }
}

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-authored text item with an importance flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(default)]
    pub important: bool,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, content: impl Into<String>, important: bool) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            important,
        }
    }

    /// Returns a copy with `important` flipped, keeping identity and content.
    pub fn with_importance_toggled(&self) -> Self {
        Self {
            important: !self.important,
            ..self.clone()
        }
    }
}

/// Candidate note submitted to the remote store for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub content: String,
    pub important: bool,
}

impl NoteDraft {
    pub fn new(content: impl Into<String>, important: bool) -> Self {
        Self {
            content: content.into(),
            important,
        }
    }
}
