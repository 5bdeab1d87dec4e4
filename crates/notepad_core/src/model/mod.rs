//! Domain model for the notepad core.
//!
//! # Responsibility
//! - Define the canonical note record shared by local and remote stores.
//! - Own the title-derivation rule and note invariants.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` minted at creation.
//! - `title` is always a pure function of `content`.

pub mod note;
