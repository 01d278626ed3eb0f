use super::*;
use crate::domain::{Label, LabelName, Note, NoteId, NoteType, StoredFields};
use crate::infra::ContentHash;
use crate::store::{SqliteStore, labels, notes};
use chrono::Utc;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn add_note(conn: &Connection, id: &str, title: &str, content: &str) -> NoteId {
    let id: NoteId = id.parse().unwrap();
    let note = Note::new(id.clone(), title, content.as_bytes().to_vec(), NoteType::Text, Utc::now());
    notes::insert(conn, &notes::NoteRow::plain(&note)).unwrap();
    id
}

fn set_content(conn: &Connection, id: &NoteId, content: &str) {
    let mut row = notes::get(conn, id).unwrap().unwrap();
    row.stored.content = content.as_bytes().to_vec();
    notes::update(conn, &row).unwrap();
}

// ===========================================
// update_index
// ===========================================

#[test]
fn indexes_new_note_with_hashes() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let id = add_note(conn, "n1", "Groceries", "<p>milk &amp; eggs</p>");

    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Inserted);

    let record = index::entry(conn, &id).unwrap().unwrap();
    assert_eq!(record.title, "Groceries");
    assert_eq!(record.content, "milk & eggs");
    assert_eq!(record.title_hash, ContentHash::of_text("Groceries"));
    assert_eq!(record.content_hash, ContentHash::of_text("milk & eggs"));
}

#[test]
fn unchanged_note_is_not_rewritten() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let id = add_note(conn, "n1", "Same", "body");

    update_index(conn, &id).unwrap();
    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Unchanged);
}

#[test]
fn changed_content_updates_row() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let id = add_note(conn, "n1", "Title", "first");
    update_index(conn, &id).unwrap();

    set_content(conn, &id, "second");

    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Updated);
    assert_eq!(index::entry(conn, &id).unwrap().unwrap().content, "second");
}

#[test]
fn deleted_note_loses_row() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let id = add_note(conn, "n1", "Title", "body");
    update_index(conn, &id).unwrap();

    notes::set_deleted(conn, &id, true, Utc::now()).unwrap();

    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Removed);
    assert!(index::entry(conn, &id).unwrap().is_none());
}

#[test]
fn protected_note_is_never_indexed() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let id = add_note(conn, "n1", "Title", "body");
    update_index(conn, &id).unwrap();

    let mut row = notes::get(conn, &id).unwrap().unwrap();
    row.is_protected = true;
    row.stored = StoredFields::new("Y2lwaGVy", vec![1, 2, 3]);
    notes::update(conn, &row).unwrap();

    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Removed);
    assert_eq!(index::count(conn).unwrap(), 0);
}

#[test]
fn archived_note_is_excluded() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let id = add_note(conn, "n1", "Old stuff", "body");
    update_index(conn, &id).unwrap();

    labels::set(conn, &id, &Label::new(LabelName::archived(), "")).unwrap();
    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Removed);

    labels::remove(conn, &id, &LabelName::archived()).unwrap();
    assert_eq!(update_index(conn, &id).unwrap(), IndexAction::Inserted);
}

#[test]
fn missing_note_is_removed() {
    let store = SqliteStore::open_in_memory().unwrap();
    let ghost: NoteId = "ghost".parse().unwrap();
    assert_eq!(update_index(store.conn(), &ghost).unwrap(), IndexAction::Removed);
}

// ===========================================
// search and reindex
// ===========================================

#[test]
fn search_matches_title_or_content_case_insensitively() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let a = add_note(conn, "a", "Rust notes", "ownership");
    let b = add_note(conn, "b", "Cooking", "rust on the pan");
    add_note(conn, "c", "Other", "nothing");
    reindex_all(conn).unwrap();

    let hits = search(conn, "RUST", 10).unwrap();
    assert_eq!(hits, vec![b.clone(), a.clone()]);
    assert_eq!(search(conn, "rust", 1).unwrap().len(), 1);
    assert!(search(conn, "   ", 10).unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let pct = add_note(conn, "pct", "100% done", "");
    add_note(conn, "plain", "1000 done", "");
    let under = add_note(conn, "under", "snake_case", "");
    add_note(conn, "nounder", "snakeXcase", "");
    reindex_all(conn).unwrap();

    assert_eq!(search(conn, "0%", 10).unwrap(), vec![pct]);
    assert_eq!(search(conn, "e_c", 10).unwrap(), vec![under]);
}

#[test]
fn search_skips_rows_of_notes_that_are_no_longer_indexable() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    let locked = add_note(conn, "locked", "Map", "treasure");
    let gone = add_note(conn, "gone", "Chest", "treasure");
    let shelved = add_note(conn, "shelved", "Old", "treasure");
    let live = add_note(conn, "live", "Live", "treasure");
    reindex_all(conn).unwrap();

    let mut row = notes::get(conn, &locked).unwrap().unwrap();
    row.is_protected = true;
    notes::update(conn, &row).unwrap();
    let mut row = notes::get(conn, &gone).unwrap().unwrap();
    row.is_deleted = true;
    notes::update(conn, &row).unwrap();
    labels::set(conn, &shelved, &Label::new(LabelName::archived(), "")).unwrap();

    // rows are still there, only the note table changed
    assert_eq!(index::count(conn).unwrap(), 5);
    assert_eq!(search(conn, "treasure", 10).unwrap(), vec![live]);
}

#[test]
fn reindex_all_rebuilds_and_skips_unindexable() {
    let store = SqliteStore::open_in_memory().unwrap();
    let conn = store.conn();
    add_note(conn, "a", "A", "x");
    let b = add_note(conn, "b", "B", "y");
    labels::set(conn, &b, &Label::new(LabelName::archived(), "")).unwrap();
    conn.execute(
        "INSERT INTO note_fulltext VALUES ('stale', 't', ?1, 'c', ?1)",
        [ContentHash::of_text("t")],
    )
    .unwrap();

    let stats = reindex_all(conn).unwrap();

    // root, a
    assert_eq!(stats.indexed, 2);
    assert_eq!(stats.skipped, 1);
    assert!(index::entry(conn, &"stale".parse().unwrap()).unwrap().is_none());
}

// ===========================================
// Queue and worker
// ===========================================

#[test]
fn repeated_enqueue_collapses_into_one_job() {
    let store = Mutex::new(SqliteStore::open_in_memory().unwrap());
    let id = {
        let s = store.lock().unwrap();
        add_note(s.conn(), "n1", "Title", "v1")
    };
    let queue = FulltextQueue::new();

    assert!(queue.enqueue(id.clone()));
    {
        let s = store.lock().unwrap();
        set_content(s.conn(), &id, "v2");
    }
    assert!(!queue.enqueue(id.clone()));
    {
        let s = store.lock().unwrap();
        set_content(s.conn(), &id, "v3");
    }
    assert!(!queue.enqueue(id.clone()));

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.process_pending(&store), 1);
    assert_eq!(queue.processed(), 1);

    let s = store.lock().unwrap();
    assert_eq!(index::entry(s.conn(), &id).unwrap().unwrap().content, "v3");
}

#[test]
fn jobs_run_in_fifo_order() {
    let store = Mutex::new(SqliteStore::open_in_memory().unwrap());
    let queue = FulltextQueue::new();
    let ids: Vec<NoteId> = {
        let s = store.lock().unwrap();
        (0..3)
            .map(|i| add_note(s.conn(), &format!("n{i}"), "t", "c"))
            .collect()
    };
    queue.enqueue_all(ids.iter().cloned());
    queue.enqueue(ids[0].clone());

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.process_pending(&store), 3);
    assert!(queue.is_empty());
}

#[test]
fn failing_job_removes_row_and_continues() {
    let store = Mutex::new(SqliteStore::open_in_memory().unwrap());
    let (broken, fine) = {
        let s = store.lock().unwrap();
        let broken = add_note(s.conn(), "broken", "Broken", "x");
        let fine = add_note(s.conn(), "fine", "Fine", "y");
        update_index(s.conn(), &broken).unwrap();
        s.conn()
            .execute("UPDATE notes SET type = 'bogus' WHERE note_id = 'broken'", [])
            .unwrap();
        (broken, fine)
    };
    let queue = FulltextQueue::new();
    queue.enqueue(broken.clone());
    queue.enqueue(fine.clone());

    assert_eq!(queue.process_pending(&store), 2);

    let s = store.lock().unwrap();
    assert!(index::entry(s.conn(), &broken).unwrap().is_none());
    assert!(index::entry(s.conn(), &fine).unwrap().is_some());
}

#[test]
fn worker_drains_queue_in_background() {
    let store = Arc::new(Mutex::new(SqliteStore::open_in_memory().unwrap()));
    let id = {
        let s = store.lock().unwrap();
        add_note(s.conn(), "n1", "Background", "text")
    };
    let queue = Arc::new(FulltextQueue::new());
    let mut worker =
        FulltextWorker::spawn(Arc::clone(&queue), Arc::clone(&store), Duration::from_millis(20)).unwrap();

    queue.enqueue(id.clone());

    let deadline = Instant::now() + Duration::from_secs(5);
    while queue.processed() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    worker.shutdown();

    let s = store.lock().unwrap();
    assert!(index::entry(s.conn(), &id).unwrap().is_some());
}

#[test]
fn worker_shutdown_returns_promptly() {
    let store = Arc::new(Mutex::new(SqliteStore::open_in_memory().unwrap()));
    let queue = Arc::new(FulltextQueue::new());
    let worker = FulltextWorker::spawn(Arc::clone(&queue), store, Duration::from_secs(60)).unwrap();

    let started = Instant::now();
    drop(worker);
    assert!(started.elapsed() < Duration::from_secs(5));
}
