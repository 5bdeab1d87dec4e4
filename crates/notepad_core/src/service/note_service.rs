//! Note façade service.
//!
//! # Responsibility
//! - Single entry point for the presentation collaborator: CRUD, windowed
//!   listing, search, sort toggling, sync orchestration.
//! - Convert every storage/transport fault into an error-channel report
//!   plus a safe default; nothing propagates as an unhandled fault.
//!
//! # Invariants
//! - Every mutation of the visible note set fires the change notification
//!   explicitly; no implicit framework observation is assumed.
//! - The pagination window only grows, clamped to `count()`, and a
//!   duplicate concurrent `load_more` is suppressed by the loading guard.
//! - Remote pushes are fire-and-forget and never enter caller control flow.

use crate::model::note::{Note, NoteId};
use crate::remote::{NoteDocument, RemoteStore};
use crate::repo::note_repo::{NoteListQuery, NoteRepository, RepoError};
use crate::service::debounce::Debouncer;
use crate::sync::engine::{SyncEngine, SyncError, SyncReport};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Notes added to the visible window per `load_more` call.
pub const PAGE_BATCH_SIZE: u32 = 20;

type ChangeListener = Box<dyn Fn() + Send + Sync>;
type ErrorListener = Box<dyn Fn(&str) + Send + Sync>;

/// Registered observers. Notification order between observers is
/// unspecified.
#[derive(Default)]
struct Listeners {
    changed: Mutex<Vec<ChangeListener>>,
    errors: Mutex<Vec<ErrorListener>>,
}

impl Listeners {
    fn notify_changed(&self) {
        if let Ok(listeners) = self.changed.lock() {
            for listener in listeners.iter() {
                listener();
            }
        }
    }

    fn report_error(&self, message: &str) {
        warn!("event=service_error module=service message={message}");
        if let Ok(listeners) = self.errors.lock() {
            for listener in listeners.iter() {
                listener(message);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowPhase {
    Idle,
    LoadingMore,
}

/// Pagination window over the sorted note list.
struct PageWindow {
    phase: WindowPhase,
    size: u32,
}

impl PageWindow {
    fn new() -> Self {
        Self {
            phase: WindowPhase::Idle,
            size: 0,
        }
    }
}

/// Façade over the note repository, remote store and sync engine.
///
/// All collaborators are injected at construction; the service holds no
/// global state and is shareable across threads (`&self` methods with
/// interior mutability for window and sort order).
pub struct NoteService<R: NoteRepository + Clone + 'static> {
    repo: R,
    remote: Option<Arc<dyn RemoteStore>>,
    listeners: Arc<Listeners>,
    window: Mutex<PageWindow>,
    sort_ascending: AtomicBool,
    debouncer: Debouncer,
}

impl<R: NoteRepository + Clone + 'static> NoteService<R> {
    /// Creates a service over a local repository only.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            remote: None,
            listeners: Arc::new(Listeners::default()),
            window: Mutex::new(PageWindow::new()),
            sort_ascending: AtomicBool::new(true),
            debouncer: Debouncer::default(),
        }
    }

    /// Attaches the remote store used for fire-and-forget backup pushes.
    pub fn attach_remote(&mut self, remote: Arc<dyn RemoteStore>) {
        self.remote = Some(remote);
    }

    /// Registers a change observer. Fired on every visible-set mutation:
    /// create, update, delete, merge, window growth and sort toggle.
    pub fn subscribe_changes(&self, listener: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.changed.lock() {
            listeners.push(Box::new(listener));
        }
    }

    /// Registers an error observer receiving human-readable messages.
    pub fn subscribe_errors(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.errors.lock() {
            listeners.push(Box::new(listener));
        }
    }

    /// Creates a note from user content.
    ///
    /// # Errors
    /// - Storage failures; also reported through the error channel.
    pub fn create(&self, content: impl Into<String>) -> Result<Note, RepoError> {
        let note = Note::new(content);
        match self.repo.create_note(&note) {
            Ok(_) => {
                info!(
                    "event=note_create module=service status=ok uuid={}",
                    note.uuid
                );
                self.listeners.notify_changed();
                self.push_remote(&note);
                Ok(note)
            }
            Err(err) => {
                self.listeners
                    .report_error(&format!("could not save note: {err}"));
                Err(err)
            }
        }
    }

    /// Replaces a note's content; title and `last_edit_time` are refreshed.
    ///
    /// # Errors
    /// - `NotFound` when the id is absent; storage failures otherwise.
    ///   All errors are also reported through the error channel.
    pub fn update(&self, id: NoteId, new_content: &str) -> Result<Note, RepoError> {
        match self.repo.update_content(id, new_content) {
            Ok(note) => {
                self.listeners.notify_changed();
                self.push_remote(&note);
                Ok(note)
            }
            Err(err) => {
                self.listeners
                    .report_error(&format!("could not update note: {err}"));
                Err(err)
            }
        }
    }

    /// Deletes a note. Idempotent: a missing id is a silent no-op and fires
    /// no change notification. Returns whether a note was removed.
    pub fn delete(&self, id: NoteId) -> bool {
        match self.repo.delete_note(id) {
            Ok(true) => {
                self.listeners.notify_changed();
                self.delete_remote(id);
                true
            }
            Ok(false) => false,
            Err(err) => {
                self.listeners
                    .report_error(&format!("could not delete note: {err}"));
                false
            }
        }
    }

    /// Returns the current pagination window in the current sort order.
    ///
    /// Empty until the first `load_more` call. Read failures are reported
    /// and fall back to an empty list.
    pub fn visible_notes(&self) -> Vec<Note> {
        let size = match self.window.lock() {
            Ok(window) => window.size,
            Err(_) => return Vec::new(),
        };
        if size == 0 {
            return Vec::new();
        }

        let query = NoteListQuery {
            ascending: self.sort_ascending(),
            limit: Some(size),
            offset: 0,
        };
        match self.repo.list_notes(&query) {
            Ok(notes) => notes,
            Err(err) => {
                self.listeners
                    .report_error(&format!("could not load notes: {err}"));
                Vec::new()
            }
        }
    }

    /// Grows the visible window by one batch unit, clamped to `count()`.
    ///
    /// Returns whether the window grew. A call while a load is already in
    /// flight is a no-op, as is a call when the window already covers every
    /// note.
    pub fn load_more(&self) -> bool {
        if !self.begin_load_more() {
            return false;
        }

        let grew = match self.repo.count_notes() {
            Ok(total) => self.commit_load_more(total),
            Err(err) => {
                self.listeners
                    .report_error(&format!("could not load more notes: {err}"));
                self.commit_load_more_unchanged();
                false
            }
        };

        if grew {
            self.listeners.notify_changed();
        }
        grew
    }

    /// Case-insensitive substring search over content and title.
    ///
    /// A blank query returns an empty set by contract. Read failures are
    /// reported and fall back to an empty list.
    pub fn search(&self, query: &str) -> Vec<Note> {
        match self.repo.search_notes(query) {
            Ok(notes) => notes,
            Err(err) => {
                self.listeners
                    .report_error(&format!("search failed: {err}"));
                Vec::new()
            }
        }
    }

    /// Debounced search for type-as-you-search input: only the last query
    /// inside the debounce window executes, and results are delivered to
    /// `sink` off the calling thread.
    pub fn search_debounced(
        &self,
        query: impl Into<String>,
        sink: impl FnOnce(Vec<Note>) + Send + 'static,
    ) {
        let query = query.into();
        let repo = self.repo.clone();
        let listeners = Arc::clone(&self.listeners);
        self.debouncer.submit(move || {
            let results = match repo.search_notes(&query) {
                Ok(results) => results,
                Err(err) => {
                    listeners.report_error(&format!("search failed: {err}"));
                    Vec::new()
                }
            };
            sink(results);
        });
    }

    /// Total stored notes; used to decide whether more pages exist.
    /// Read failures are reported and fall back to zero.
    pub fn count(&self) -> u64 {
        match self.repo.count_notes() {
            Ok(count) => count,
            Err(err) => {
                self.listeners
                    .report_error(&format!("could not count notes: {err}"));
                0
            }
        }
    }

    /// Current sort direction over `created_time`.
    pub fn sort_ascending(&self) -> bool {
        self.sort_ascending.load(Ordering::SeqCst)
    }

    /// Changes the sort direction. A changed direction fires the change
    /// notification so the presentation layer re-fetches.
    pub fn set_sort_order(&self, ascending: bool) {
        let previous = self.sort_ascending.swap(ascending, Ordering::SeqCst);
        if previous != ascending {
            self.listeners.notify_changed();
        }
    }

    /// Runs one sync cycle, reporting failures through the error channel
    /// and firing the change notification when the merge added notes.
    ///
    /// # Errors
    /// - The engine's cycle error, after it has been reported.
    pub fn sync_with<E: NoteRepository>(
        &self,
        engine: &SyncEngine<E>,
    ) -> Result<SyncReport, SyncError> {
        match engine.sync_once() {
            Ok(report) => {
                if report.merged > 0 {
                    self.listeners.notify_changed();
                }
                Ok(report)
            }
            Err(err) => {
                self.listeners.report_error(&format!("sync failed: {err}"));
                Err(err)
            }
        }
    }

    fn begin_load_more(&self) -> bool {
        let mut window = match self.window.lock() {
            Ok(window) => window,
            Err(_) => return false,
        };
        if window.phase == WindowPhase::LoadingMore {
            return false;
        }
        window.phase = WindowPhase::LoadingMore;
        true
    }

    fn commit_load_more(&self, total: u64) -> bool {
        let total = total.min(u64::from(u32::MAX)) as u32;
        let mut window = match self.window.lock() {
            Ok(window) => window,
            Err(_) => return false,
        };
        window.phase = WindowPhase::Idle;

        let target = window.size.saturating_add(PAGE_BATCH_SIZE).min(total);
        if target > window.size {
            window.size = target;
            true
        } else {
            false
        }
    }

    fn commit_load_more_unchanged(&self) {
        if let Ok(mut window) = self.window.lock() {
            window.phase = WindowPhase::Idle;
        }
    }

    /// Fire-and-forget backup push; failures land on the error channel.
    fn push_remote(&self, note: &Note) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let document = NoteDocument::from(note);
        let listeners = Arc::clone(&self.listeners);
        thread::spawn(move || {
            if let Err(err) = remote.push(&document) {
                listeners.report_error(&format!(
                    "backup of note {} failed: {err}",
                    document.uuid
                ));
            }
        });
    }

    /// Fire-and-forget remote removal mirroring a local delete.
    fn delete_remote(&self, id: NoteId) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let listeners = Arc::clone(&self.listeners);
        thread::spawn(move || {
            if let Err(err) = remote.delete(&id.to_string()) {
                listeners.report_error(&format!("remote delete of note {id} failed: {err}"));
            }
        });
    }
}
