use serde_derive::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::errors::{CommonError, Fields, ServerError};
use crate::store::NoteMap;

pub const NOTE_VERSION: &str = "1";

fn default_version() -> String {
    NOTE_VERSION.to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Option<u64>,
    pub secret: Option<String>,
    pub message: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Note {
    pub fn new(message: String) -> Self {
        Note {
            id: None,
            secret: None,
            message,
            version: default_version(),
        }
    }

    pub fn with_id(id: u64, message: String) -> Self {
        Note {
            id: Some(id),
            ..Note::new(message)
        }
    }
}

/// What a caller is allowed to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Standard,
    /// Authenticated API clients, who may read note secrets.
    Api,
}

#[derive(Clone, Debug, Serialize)]
pub struct NoteView {
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub message: String,
    pub version: String,
}

impl NoteView {
    pub fn shape(note: Note, role: Role) -> Self {
        NoteView {
            id: note.id,
            secret: match role {
                Role::Api => note.secret,
                Role::Standard => None,
            },
            message: note.message,
            version: note.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteCollection {
    pub notes: BTreeMap<u64, NoteView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub limit: usize,
}

impl NoteCollection {
    pub fn shape(notes: NoteMap, offset: Option<u64>, limit: usize, role: Role) -> Self {
        NoteCollection {
            notes: notes
                .into_iter()
                .map(|(id, note)| (id, NoteView::shape(note, role)))
                .collect(),
            offset,
            limit,
        }
    }
}

/// Submitted note fields. Only the message is editable.
#[derive(Clone, Debug, Deserialize)]
pub struct NoteForm {
    pub message: Option<String>,
}

impl NoteForm {
    /// The form layout served to clients that build their own editor.
    pub fn describe() -> Value {
        json!({ "children": { "message": {} } })
    }

    pub fn validate(self) -> Result<String, ServerError> {
        match self.message {
            Some(message) if !message.trim().is_empty() => Ok(message),
            _ => Err(ServerError::Validation(vec![Fields::Message(
                CommonError::Blank,
            )])),
        }
    }
}
