//! Local/remote reconciliation.
//!
//! # Responsibility
//! - Drive the pull -> merge -> push cycle between the note repository and
//!   a remote document store.
//!
//! # Invariants
//! - Merge is an additive union: a remote record never overwrites an
//!   existing local note.
//! - A failed cycle leaves both stores in their last-known-good state and
//!   is safe to retry.

pub mod engine;

pub use engine::{SyncEngine, SyncError, SyncReport};
