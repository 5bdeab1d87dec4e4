//! Remote document store contracts and implementations.
//!
//! # Responsibility
//! - Define the store interface the sync engine pulls from and pushes to.
//! - Keep transport details (HTTP, in-memory fake) behind one trait.
//!
//! # Invariants
//! - Remote documents are keyed by the same note `uuid` as local storage.
//! - A transport failure is an `Err`, never an empty success: callers can
//!   always distinguish an errored pull from a legitimately empty store.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document;
pub mod http;
pub mod memory;

pub use document::NoteDocument;
pub use http::HttpRemoteStore;
pub use memory::InMemoryRemoteStore;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote-store error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network/transport failure. Never fatal; retried on the next
    /// sync trigger rather than with automatic backoff.
    Transport(String),
    /// The remote answered but the payload could not be decoded.
    InvalidDocument(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "remote store unavailable: {message}"),
            Self::InvalidDocument(message) => {
                write!(f, "invalid remote document: {message}")
            }
        }
    }
}

impl Error for RemoteError {}

/// Networked backup of notes, keyed by note uuid.
///
/// Implementations are shared across threads: pushes for different notes may
/// run in parallel and need no mutual ordering.
pub trait RemoteStore: Send + Sync {
    /// Upserts the full field set for one note under its uuid.
    ///
    /// Idempotent: pushing the same document twice leaves the store in the
    /// same state.
    fn push(&self, document: &NoteDocument) -> RemoteResult<()>;

    /// Retrieves every remote note document.
    fn pull_all(&self) -> RemoteResult<Vec<NoteDocument>>;

    /// Removes one document by uuid. Idempotent: deleting an absent
    /// document is a no-op, not an error.
    fn delete(&self, uuid: &str) -> RemoteResult<()>;
}
