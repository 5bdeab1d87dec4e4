use notepad_core::db::open_db_in_memory;
use notepad_core::{Note, NoteRepository, SqliteNoteRepository};

fn repo_with(contents: &[&str]) -> SqliteNoteRepository {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    for content in contents {
        repo.create_note(&Note::new(*content)).unwrap();
    }
    repo
}

#[test]
fn search_matches_content_substring_case_insensitively() {
    let repo = repo_with(&["Buy MILK today", "water the plants", "call the plumber"]);

    let hits = repo.search_notes("milk").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "Buy MILK today");

    let hits = repo.search_notes("PLANTS").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "water the plants");
}

#[test]
fn search_matches_derived_title() {
    // Title is the segment before the first period; content after it does
    // not contain the queried word in the same case.
    let repo = repo_with(&["Meeting Agenda. discuss budget"]);

    let hits = repo.search_notes("agenda").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Meeting Agenda");
}

#[test]
fn search_without_match_returns_empty() {
    let repo = repo_with(&["alpha", "beta"]);
    assert!(repo.search_notes("xyz").unwrap().is_empty());
}

#[test]
fn blank_query_returns_empty_not_full_list() {
    let repo = repo_with(&["alpha", "beta"]);
    assert!(repo.search_notes("").unwrap().is_empty());
    assert!(repo.search_notes("   ").unwrap().is_empty());
}

#[test]
fn like_metacharacters_match_literally() {
    let repo = repo_with(&["progress: 50% done", "underscore_name", "plain note"]);

    let hits = repo.search_notes("50%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "progress: 50% done");

    let hits = repo.search_notes("score_na").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "underscore_name");

    // `%` must not act as a wildcard.
    assert!(repo.search_notes("pl%in").unwrap().is_empty());
}

#[test]
fn search_results_are_ordered_deterministically() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    for (content, at) in [("shared term b", 200i64), ("shared term a", 100)] {
        let mut note = Note::new(content);
        note.created_time = at;
        note.last_edit_time = at;
        repo.create_note(&note).unwrap();
    }

    let hits = repo.search_notes("shared term").unwrap();
    let contents: Vec<&str> = hits.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, ["shared term a", "shared term b"]);
}
