//! Note persistence and synchronization core.
//!
//! Owns note lifecycle, batched fetching, sorting and search, and
//! reconciliation between the local SQLite store and a remote document
//! store under an offline-first, eventually-consistent model. Presentation
//! and authentication are external collaborators.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;
pub mod sync;

pub use auth::{AnonymousAuth, AuthProvider, StaticAuth};
pub use logging::{default_log_level, init_logging};
pub use model::note::{derive_title, Note, NoteId, NoteValidationError};
pub use remote::{
    HttpRemoteStore, InMemoryRemoteStore, NoteDocument, RemoteError, RemoteResult, RemoteStore,
};
pub use repo::note_repo::{
    NoteListQuery, NoteRepository, RepoError, RepoResult, SqliteNoteRepository,
};
pub use service::debounce::{Debouncer, DEFAULT_DEBOUNCE_WINDOW};
pub use service::note_service::{NoteService, PAGE_BATCH_SIZE};
pub use sync::engine::{SyncEngine, SyncError, SyncReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
