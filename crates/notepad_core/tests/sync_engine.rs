use notepad_core::db::open_db_in_memory;
use notepad_core::{
    InMemoryRemoteStore, Note, NoteDocument, NoteRepository, RemoteResult, RemoteStore,
    SqliteNoteRepository, SyncEngine, SyncError,
};
use std::sync::Arc;

fn repo() -> SqliteNoteRepository {
    let conn = open_db_in_memory().unwrap();
    SqliteNoteRepository::try_new(conn).unwrap()
}

#[test]
fn sync_unions_local_and_remote_sets() {
    // Local store has note A, remote store has note B.
    let repo = repo();
    let note_a = Note::new("foo");
    repo.create_note(&note_a).unwrap();

    let remote = Arc::new(InMemoryRemoteStore::new());
    let note_b = Note::new("bar");
    remote.push(&NoteDocument::from(&note_b)).unwrap();

    let engine = SyncEngine::new(repo.clone(), remote.clone());
    let report = engine.sync_once().unwrap();

    assert_eq!(report.pulled, 1);
    assert_eq!(report.merged, 1);
    assert_eq!(report.pushed, 2);
    assert_eq!(report.push_failures, 0);

    // Both stores now contain both notes.
    assert_eq!(repo.count_notes().unwrap(), 2);
    assert_eq!(repo.get_note(note_b.uuid).unwrap().unwrap().content, "bar");
    assert_eq!(remote.len(), 2);
}

#[test]
fn merge_is_additive_and_preserves_remote_field_values() {
    let repo = repo();
    let remote = Arc::new(InMemoryRemoteStore::new());

    let mut incoming = Note::new("Remote note. body");
    incoming.created_time = 1111;
    incoming.last_edit_time = 2222;
    incoming.background_theme = "Sunset".to_string();
    remote.push(&NoteDocument::from(&incoming)).unwrap();

    let engine = SyncEngine::new(repo.clone(), remote);
    engine.sync_once().unwrap();

    let merged = repo.get_note(incoming.uuid).unwrap().unwrap();
    assert_eq!(merged.content, "Remote note. body");
    assert_eq!(merged.title, "Remote note");
    assert_eq!(merged.created_time, 1111);
    assert_eq!(merged.last_edit_time, 2222);
    assert_eq!(merged.background_theme, "Sunset");
}

#[test]
fn merge_never_overwrites_divergent_local_content() {
    let repo = repo();
    let local = Note::new("local wins. body");
    repo.create_note(&local).unwrap();

    let remote = Arc::new(InMemoryRemoteStore::new());
    let divergent = Note::with_id(local.uuid, "remote loses. body");
    remote.push(&NoteDocument::from(&divergent)).unwrap();

    let engine = SyncEngine::new(repo.clone(), remote.clone());
    let report = engine.sync_once().unwrap();

    assert_eq!(report.pulled, 1);
    assert_eq!(report.merged, 0);
    assert_eq!(
        repo.get_note(local.uuid).unwrap().unwrap().content,
        "local wins. body"
    );

    // Push then propagates the winning local copy back to the remote.
    let documents = remote.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].content, "local wins. body");
}

#[test]
fn pull_transport_failure_suppresses_merge_and_push() {
    let repo = repo();
    let local = Note::new("untouched");
    repo.create_note(&local).unwrap();

    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.push(&NoteDocument::from(&Note::new("remote only"))).unwrap();
    remote.set_fail_transport(true);

    let engine = SyncEngine::new(repo.clone(), remote.clone());
    let err = engine.sync_once().unwrap_err();
    assert!(matches!(err, SyncError::RemoteUnavailable(_)));

    // Nothing merged locally, nothing pushed: last-known-good on both sides.
    assert_eq!(repo.count_notes().unwrap(), 1);
    assert_eq!(remote.len(), 1);

    // The failed cycle is safe to retry once transport recovers.
    remote.set_fail_transport(false);
    let report = engine.sync_once().unwrap();
    assert_eq!(report.merged, 1);
    assert_eq!(repo.count_notes().unwrap(), 2);
}

#[test]
fn undecodable_remote_documents_are_skipped_not_fatal() {
    let repo = repo();
    let remote = Arc::new(InMemoryRemoteStore::new());

    let mut broken = NoteDocument::from(&Note::new("broken"));
    broken.uuid = "not-a-uuid".to_string();
    remote.push(&broken).unwrap();
    remote.push(&NoteDocument::from(&Note::new("healthy"))).unwrap();

    let engine = SyncEngine::new(repo.clone(), remote);
    let report = engine.sync_once().unwrap();

    assert_eq!(report.pulled, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.merged, 1);
    assert_eq!(repo.count_notes().unwrap(), 1);
}

/// Remote whose pulls succeed but whose pushes always fail, to exercise the
/// per-note push failure accounting.
struct PushFailingRemote {
    inner: InMemoryRemoteStore,
}

impl RemoteStore for PushFailingRemote {
    fn push(&self, _document: &NoteDocument) -> RemoteResult<()> {
        Err(notepad_core::RemoteError::Transport(
            "push rejected".to_string(),
        ))
    }

    fn pull_all(&self) -> RemoteResult<Vec<NoteDocument>> {
        self.inner.pull_all()
    }

    fn delete(&self, uuid: &str) -> RemoteResult<()> {
        self.inner.delete(uuid)
    }
}

#[test]
fn push_failures_are_counted_but_not_fatal() {
    let repo = repo();
    repo.create_note(&Note::new("first")).unwrap();
    repo.create_note(&Note::new("second")).unwrap();

    let remote = Arc::new(PushFailingRemote {
        inner: InMemoryRemoteStore::new(),
    });
    let engine = SyncEngine::new(repo, remote);
    let report = engine.sync_once().unwrap();

    assert_eq!(report.pushed, 0);
    assert_eq!(report.push_failures, 2);
}

#[test]
fn sync_is_idempotent_when_stores_already_agree() {
    let repo = repo();
    let note = Note::new("stable");
    repo.create_note(&note).unwrap();

    let remote = Arc::new(InMemoryRemoteStore::new());
    let engine = SyncEngine::new(repo.clone(), remote.clone());

    engine.sync_once().unwrap();
    let second = engine.sync_once().unwrap();

    assert_eq!(second.merged, 0);
    assert_eq!(second.pushed, 1);
    assert_eq!(repo.count_notes().unwrap(), 1);
    assert_eq!(remote.len(), 1);
}
