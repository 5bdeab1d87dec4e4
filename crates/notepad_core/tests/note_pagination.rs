use notepad_core::db::open_db_in_memory;
use notepad_core::{
    Note, NoteListQuery, NoteRepository, NoteService, SqliteNoteRepository, PAGE_BATCH_SIZE,
};

fn repo() -> SqliteNoteRepository {
    let conn = open_db_in_memory().unwrap();
    SqliteNoteRepository::try_new(conn).unwrap()
}

fn note_at(content: &str, created_time: i64) -> Note {
    let mut note = Note::new(content);
    note.created_time = created_time;
    note.last_edit_time = created_time;
    note
}

#[test]
fn list_orders_by_created_time_in_both_directions() {
    let repo = repo();
    for (content, at) in [("third", 300), ("first", 100), ("second", 200)] {
        repo.create_note(&note_at(content, at)).unwrap();
    }

    let ascending = repo
        .list_notes(&NoteListQuery {
            ascending: true,
            ..NoteListQuery::default()
        })
        .unwrap();
    let contents: Vec<&str> = ascending.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, ["first", "second", "third"]);

    let descending = repo
        .list_notes(&NoteListQuery {
            ascending: false,
            ..NoteListQuery::default()
        })
        .unwrap();
    let contents: Vec<&str> = descending.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, ["third", "second", "first"]);
}

#[test]
fn created_time_ties_break_deterministically_by_uuid() {
    let repo = repo();
    let mut expected: Vec<String> = Vec::new();
    for index in 0..5 {
        let note = note_at(&format!("tied {index}"), 1000);
        expected.push(note.uuid.to_string());
        repo.create_note(&note).unwrap();
    }
    expected.sort();

    let listed = repo.list_notes(&NoteListQuery::default()).unwrap();
    let order: Vec<String> = listed.iter().map(|n| n.uuid.to_string()).collect();
    assert_eq!(order, expected);

    // The same tie-break applies in descending direction.
    let descending = repo
        .list_notes(&NoteListQuery {
            ascending: false,
            ..NoteListQuery::default()
        })
        .unwrap();
    let order: Vec<String> = descending.iter().map(|n| n.uuid.to_string()).collect();
    assert_eq!(order, expected);
}

#[test]
fn list_supports_limit_and_offset() {
    let repo = repo();
    for index in 0..10 {
        repo.create_note(&note_at(&format!("note {index}"), index))
            .unwrap();
    }

    let page = repo
        .list_notes(&NoteListQuery {
            ascending: true,
            limit: Some(3),
            offset: 4,
        })
        .unwrap();
    let contents: Vec<&str> = page.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, ["note 4", "note 5", "note 6"]);
}

#[test]
fn load_more_grows_window_in_batches_and_clamps_to_count() {
    let repo = repo();
    for index in 0..25 {
        repo.create_note(&note_at(&format!("note {index:02}"), i64::from(index)))
            .unwrap();
    }
    let service = NoteService::new(repo);

    // Nothing is visible before the first page load.
    assert!(service.visible_notes().is_empty());

    assert!(service.load_more());
    assert_eq!(service.visible_notes().len(), PAGE_BATCH_SIZE as usize);

    assert!(service.load_more());
    assert_eq!(service.visible_notes().len(), 25);

    // Window already covers all notes: load_more is a no-op.
    assert!(!service.load_more());
    assert_eq!(service.visible_notes().len(), 25);
}

#[test]
fn window_never_shrinks_and_never_exceeds_count() {
    let repo = repo();
    for index in 0..30 {
        repo.create_note(&note_at(&format!("note {index:02}"), i64::from(index)))
            .unwrap();
    }
    let service = NoteService::new(repo);

    let mut previous = 0;
    for _ in 0..5 {
        service.load_more();
        let visible = service.visible_notes().len();
        assert!(visible >= previous);
        assert!(visible as u64 <= service.count());
        previous = visible;
    }
    assert_eq!(previous, 30);
}

#[test]
fn visible_notes_follow_current_sort_order() {
    let repo = repo();
    repo.create_note(&note_at("oldest", 1)).unwrap();
    repo.create_note(&note_at("newest", 2)).unwrap();
    let service = NoteService::new(repo);
    service.load_more();

    assert!(service.sort_ascending());
    let ascending = service.visible_notes();
    assert_eq!(ascending[0].content, "oldest");

    service.set_sort_order(false);
    let descending = service.visible_notes();
    assert_eq!(descending[0].content, "newest");
}
