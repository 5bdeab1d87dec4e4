//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable CRUD, listing, search and count APIs over `notes`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before SQL mutations.
//! - Listing is ordered by `created_time` with `uuid ASC` tie-break.
//! - All mutations against one storage handle are serialized.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    created_time,
    last_edit_time,
    background_theme
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing notes.
#[derive(Debug, Clone)]
pub struct NoteListQuery {
    /// Sort direction over `created_time`. Ties break by `uuid ASC` in both
    /// directions so pagination stays deterministic.
    pub ascending: bool,
    /// Maximum rows to return. `None` returns the full set.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl Default for NoteListQuery {
    fn default() -> Self {
        Self {
            ascending: true,
            limit: None,
            offset: 0,
        }
    }
}

/// Repository interface for note CRUD, listing and search.
///
/// `Send + Sync` so sync and fire-and-forget push paths can run off the
/// caller's thread against a shared handle.
pub trait NoteRepository: Send + Sync {
    /// Persists a validated note and returns its stable id.
    fn create_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces content, re-derives title, refreshes `last_edit_time`.
    fn update_content(&self, id: NoteId, new_content: &str) -> RepoResult<Note>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes ordered by `created_time`, ties broken by `uuid`.
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Case-insensitive substring search over content OR title.
    ///
    /// A blank query returns an empty result set by contract.
    fn search_notes(&self, query: &str) -> RepoResult<Vec<Note>>;
    /// Removes one note. Idempotent: a missing id is a no-op, and the
    /// return value reports whether a row was actually removed.
    fn delete_note(&self, id: NoteId) -> RepoResult<bool>;
    /// Total number of stored notes.
    fn count_notes(&self) -> RepoResult<u64>;
    /// Merge primitive: inserts only when `uuid` is absent, never
    /// overwrites an existing note. Returns whether a row was inserted.
    fn insert_if_absent(&self, note: &Note) -> RepoResult<bool>;
}

/// SQLite-backed note repository.
///
/// The connection is the process-wide storage handle; the internal mutex
/// serializes mutations and gives reads a consistent snapshot. Clones share
/// the same handle.
#[derive(Clone)]
pub struct SqliteNoteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteNoteRepository {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - Schema-shape errors when the `notes` table or a required column is
    ///   missing. Fatal at startup by contract.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Constructs a repository sharing an already-wrapped connection handle.
    pub fn try_with_shared(conn: Arc<Mutex<Connection>>) -> RepoResult<Self> {
        {
            let guard = lock_conn(&conn)?;
            ensure_note_connection_ready(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        lock_conn(&self.conn)
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notes (
                uuid,
                title,
                content,
                created_time,
                last_edit_time,
                background_theme
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.created_time,
                note.last_edit_time,
                note.background_theme.as_str(),
            ],
        )?;

        Ok(note.uuid)
    }

    fn update_content(&self, id: NoteId, new_content: &str) -> RepoResult<Note> {
        let conn = self.lock()?;

        // Read-modify-write under one lock hold so title/timestamp
        // derivation stays consistent with what is persisted.
        let mut note = match query_note(&conn, id)? {
            Some(note) => note,
            None => return Err(RepoError::NotFound(id)),
        };
        note.set_content(new_content);
        note.validate()?;

        let changed = conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                last_edit_time = ?4
             WHERE uuid = ?1;",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.last_edit_time,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(note)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let conn = self.lock()?;
        query_note(&conn, id)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = String::from(NOTE_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if query.ascending {
            sql.push_str(" ORDER BY created_time ASC, uuid ASC");
        } else {
            sql.push_str(" ORDER BY created_time DESC, uuid ASC");
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn search_notes(&self, query: &str) -> RepoResult<Vec<Note>> {
        // Blank queries return an empty set, not the full list.
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(query));
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE content LIKE ?1 ESCAPE '\\'
                OR title LIKE ?1 ESCAPE '\\'
             ORDER BY created_time ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([pattern.as_str()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn count_notes(&self) -> RepoResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn insert_if_absent(&self, note: &Note) -> RepoResult<bool> {
        note.validate()?;

        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO notes (
                uuid,
                title,
                content,
                created_time,
                last_edit_time,
                background_theme
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.created_time,
                note.last_edit_time,
                note.background_theme.as_str(),
            ],
        )?;

        Ok(changed > 0)
    }
}

/// Escapes `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn lock_conn(conn: &Arc<Mutex<Connection>>) -> RepoResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| RepoError::InvalidData("note storage lock poisoned".to_string()))
}

fn query_note(conn: &Connection, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_note_row(row)?));
    }
    Ok(None)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })?;

    Ok(Note {
        uuid,
        title: row.get("title")?,
        content: row.get("content")?,
        created_time: row.get("created_time")?,
        last_edit_time: row.get("last_edit_time")?,
        background_theme: row.get("background_theme")?,
    })
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in [
        "uuid",
        "title",
        "content",
        "created_time",
        "last_edit_time",
        "background_theme",
    ] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &'static str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_quotes_metacharacters() {
        assert_eq!(escape_like("50%_done\\x"), "50\\%\\_done\\\\x");
        assert_eq!(escape_like("plain"), "plain");
    }
}
