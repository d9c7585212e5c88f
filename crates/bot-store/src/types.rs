//! Stored note types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single note left by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    pub author_tag: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(content: impl Into<String>, author_tag: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author_tag: author_tag.into(),
            created_at: Utc::now(),
        }
    }
}

/// All notes kept under one scope key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteBook {
    pub scope: String,
    pub notes: Vec<Note>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteBook {
    pub fn new(scope: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            scope: scope.into(),
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a note.
    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
        self.updated_at = Utc::now();
    }

    /// Trim to max notes, keeping most recent.
    pub fn trim(&mut self, max_notes: usize) {
        if self.notes.len() > max_notes {
            let start = self.notes.len() - max_notes;
            self.notes.drain(..start);
        }
    }
}

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process memory, named for log output only.
    Memory { name: String },
}

impl StoreLocation {
    /// Parse a store URL such as `memory://local`.
    pub fn parse(url: &str) -> Result<Self, crate::StoreError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(crate::StoreError::MissingUrl);
        }

        match url.split_once("://") {
            Some(("memory", name)) => Ok(Self::Memory {
                name: if name.is_empty() { "default".into() } else { name.into() },
            }),
            Some((scheme, _)) => Err(crate::StoreError::UnsupportedScheme(scheme.into())),
            None => Err(crate::StoreError::UnsupportedScheme(url.into())),
        }
    }
}
