//! Wire representation of a note in the remote document store.
//!
//! # Responsibility
//! - Mirror the remote document layout exactly (camelCase keys, uuid as
//!   string).
//! - Convert between wire documents and the domain `Note`, rejecting
//!   documents that violate note invariants instead of masking them.

use crate::model::note::{derive_title, Note, NoteId, DEFAULT_BACKGROUND_THEME};
use crate::remote::RemoteError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-note remote document, keyed by `uuid` as string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDocument {
    pub uuid: String,
    pub title: String,
    pub content: String,
    pub created_time: i64,
    pub last_edit_time: i64,
    #[serde(default = "default_theme")]
    pub background_theme: String,
}

fn default_theme() -> String {
    DEFAULT_BACKGROUND_THEME.to_string()
}

impl From<&Note> for NoteDocument {
    fn from(note: &Note) -> Self {
        Self {
            uuid: note.uuid.to_string(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_time: note.created_time,
            last_edit_time: note.last_edit_time,
            background_theme: note.background_theme.clone(),
        }
    }
}

impl NoteDocument {
    /// Decodes this document into a domain note.
    ///
    /// The title is re-derived from content rather than trusted, so a
    /// document written by an older client cannot smuggle in a diverged
    /// title.
    ///
    /// # Errors
    /// - `InvalidDocument` for an unparseable uuid or inverted timestamps.
    pub fn try_into_note(&self) -> Result<Note, RemoteError> {
        let uuid: NoteId = Uuid::parse_str(&self.uuid).map_err(|_| {
            RemoteError::InvalidDocument(format!("unparseable uuid `{}`", self.uuid))
        })?;

        if self.created_time > self.last_edit_time {
            return Err(RemoteError::InvalidDocument(format!(
                "createdTime {} is later than lastEditTime {} for `{}`",
                self.created_time, self.last_edit_time, self.uuid
            )));
        }

        Ok(Note {
            uuid,
            title: derive_title(&self.content),
            content: self.content.clone(),
            created_time: self.created_time,
            last_edit_time: self.last_edit_time,
            background_theme: self.background_theme.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NoteDocument;
    use crate::model::note::Note;
    use crate::remote::RemoteError;

    #[test]
    fn document_uses_camel_case_wire_keys() {
        let note = Note::new("Groceries. milk");
        let document = NoteDocument::from(&note);
        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(json["uuid"], note.uuid.to_string());
        assert_eq!(json["title"], "Groceries");
        assert!(json.get("createdTime").is_some());
        assert!(json.get("lastEditTime").is_some());
        assert!(json.get("backgroundTheme").is_some());
    }

    #[test]
    fn decode_rederives_title_and_checks_timestamps() {
        let note = Note::new("Original. body");
        let mut document = NoteDocument::from(&note);
        document.title = "stale remote title".to_string();

        let decoded = document.try_into_note().unwrap();
        assert_eq!(decoded.title, "Original");
        decoded.validate().unwrap();

        document.created_time = document.last_edit_time + 1;
        assert!(matches!(
            document.try_into_note(),
            Err(RemoteError::InvalidDocument(_))
        ));
    }

    #[test]
    fn decode_rejects_unparseable_uuid() {
        let document = NoteDocument {
            uuid: "not-a-uuid".to_string(),
            title: String::new(),
            content: "x".to_string(),
            created_time: 1,
            last_edit_time: 2,
            background_theme: "Default".to_string(),
        };
        assert!(matches!(
            document.try_into_note(),
            Err(RemoteError::InvalidDocument(_))
        ));
    }
}
