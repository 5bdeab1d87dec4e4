//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted locally and mirrored remotely.
//! - Derive the display title from content on every edit.
//!
//! # Invariants
//! - `uuid` is stable, minted exactly once at creation, never reused.
//! - `created_time <= last_edit_time` at all times.
//! - `title` never diverges from `derive_title(content)`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// This is the join key between the local and remote stores; storage-internal
/// row handles are never used for sync identity.
pub type NoteId = Uuid;

/// Theme tag applied to notes that carry no explicit theme.
pub const DEFAULT_BACKGROUND_THEME: &str = "Default";

/// Title used when content yields no usable first segment.
pub const UNTITLED: &str = "Untitled";

/// Canonical note record.
///
/// Timestamps are unix epoch milliseconds. `background_theme` is an opaque
/// cosmetic tag the core stores and forwards without interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID used for cross-store identity.
    pub uuid: NoteId,
    /// Derived from `content`; never independently settable.
    pub title: String,
    /// Free-form text, the only user-edited field.
    pub content: String,
    /// Set once at creation, immutable afterwards.
    pub created_time: i64,
    /// Refreshed on every content modification.
    pub last_edit_time: i64,
    /// Cosmetic tag, opaque to the core.
    pub background_theme: String,
}

/// Invariant violations rejected at write boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `created_time` is later than `last_edit_time`.
    TimestampsInverted {
        created_time: i64,
        last_edit_time: i64,
    },
    /// Stored title does not match `derive_title(content)`.
    TitleDiverged { expected: String, actual: String },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimestampsInverted {
                created_time,
                last_edit_time,
            } => write!(
                f,
                "created_time {created_time} is later than last_edit_time {last_edit_time}"
            ),
            Self::TitleDiverged { expected, actual } => {
                write!(f, "title `{actual}` diverged from derived `{expected}`")
            }
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Creates a new note with a freshly minted stable ID.
    ///
    /// # Invariants
    /// - `title` is derived from `content`.
    /// - `created_time == last_edit_time` at creation.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let now = now_ms();
        Self {
            uuid: Uuid::new_v4(),
            title: derive_title(&content),
            content,
            created_time: now,
            last_edit_time: now,
            background_theme: DEFAULT_BACKGROUND_THEME.to_string(),
        }
    }

    /// Creates a note with a caller-provided stable ID.
    ///
    /// Used by merge/import paths where identity already exists externally.
    pub fn with_id(uuid: NoteId, content: impl Into<String>) -> Self {
        let mut note = Self::new(content);
        note.uuid = uuid;
        note
    }

    /// Replaces content, re-derives the title and refreshes `last_edit_time`.
    pub fn set_content(&mut self, new_content: impl Into<String>) {
        self.content = new_content.into();
        self.title = derive_title(&self.content);
        self.last_edit_time = now_ms().max(self.created_time);
    }

    /// Checks note invariants before persistence.
    ///
    /// # Errors
    /// - `TimestampsInverted` when `created_time > last_edit_time`.
    /// - `TitleDiverged` when `title != derive_title(content)`.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.created_time > self.last_edit_time {
            return Err(NoteValidationError::TimestampsInverted {
                created_time: self.created_time,
                last_edit_time: self.last_edit_time,
            });
        }
        let expected = derive_title(&self.content);
        if self.title != expected {
            return Err(NoteValidationError::TitleDiverged {
                expected,
                actual: self.title.clone(),
            });
        }
        Ok(())
    }
}

/// Derives the display title from note content.
///
/// Rules:
/// - The title is the substring before the first `.`.
/// - Content without a `.` titles as the whole content.
/// - An empty first segment (empty content, or content starting with `.`)
///   yields `"Untitled"`.
///
/// Pure, no side effects.
pub fn derive_title(content: &str) -> String {
    let first_segment = content.split('.').next().unwrap_or("");
    if first_segment.is_empty() {
        UNTITLED.to_string()
    } else {
        first_segment.to_string()
    }
}

/// Current wall-clock time in unix epoch milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
