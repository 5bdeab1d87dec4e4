//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, remote and sync calls into the single façade
//!   the presentation layer consumes.
//! - Keep UI layers decoupled from storage and transport details.

pub mod debounce;
pub mod note_service;
