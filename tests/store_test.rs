//! Note lifecycle tests run against every storage backend
//!
//! Each property is checked for both the relational (SQLite) store and the
//! embedded (redb) store through the `NoteStore` trait.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use tempfile::{NamedTempFile, TempDir};

use notesrv::error::NoteError;
use notesrv::model::NewNote;
use notesrv::store::{NoteStore, RedbNoteStore, SqlNoteStore};
use notesrv::uid;

/// Keeps the temporary files alive for as long as the store is used
enum TempStorage {
    Dir(#[allow(dead_code)] TempDir),
    File(#[allow(dead_code)] NamedTempFile),
}

async fn sql_store() -> (Arc<dyn NoteStore>, TempStorage) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let options = SqliteConnectOptions::new().filename(dir.path().join("notes.db"));
    let store = SqlNoteStore::open(options)
        .await
        .expect("Failed to open sqlite store");
    (Arc::new(store), TempStorage::Dir(dir))
}

fn redb_store() -> (Arc<dyn NoteStore>, TempStorage) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let store = RedbNoteStore::open(temp_db.path()).expect("Failed to open redb store");
    (Arc::new(store), TempStorage::File(temp_db))
}

async fn all_stores() -> Vec<(&'static str, Arc<dyn NoteStore>, TempStorage)> {
    let (sql, sql_tmp) = sql_store().await;
    let (redb, redb_tmp) = redb_store();
    vec![("sqlite", sql, sql_tmp), ("redb", redb, redb_tmp)]
}

fn single_use(title: &str, note: &str) -> NewNote {
    NewNote {
        uid: uid::generate(),
        title: title.to_string(),
        note: note.to_string(),
        expires: None,
    }
}

#[tokio::test]
async fn single_use_note_is_read_exactly_once() {
    for (name, store, _tmp) in all_stores().await {
        let new = single_use("Hello", "World");
        let uid = new.uid.clone();

        let created = store.create(new).await.expect(name);
        assert_eq!(created.uid, uid, "{name}");
        assert!(created.expires.is_none(), "{name}");

        let note = store.fetch_and_consume(&uid).await.expect(name);
        assert_eq!(note.title, "Hello", "{name}");
        assert_eq!(note.note, "World", "{name}");
        assert_eq!(note.created, created.created, "{name}");

        assert!(
            matches!(store.fetch_and_consume(&uid).await, Err(NoteError::NotFound)),
            "{name}: second read must not find the note"
        );
    }
}

#[tokio::test]
async fn unknown_uid_is_not_found() {
    for (name, store, _tmp) in all_stores().await {
        assert!(
            matches!(
                store.fetch_and_consume("doesNotExist").await,
                Err(NoteError::NotFound)
            ),
            "{name}"
        );
    }
}

#[tokio::test]
async fn timed_note_is_readable_until_expiry() {
    for (name, store, _tmp) in all_stores().await {
        let new = NewNote {
            expires: Some(Utc::now() + Duration::milliseconds(400)),
            ..single_use("T", "B")
        };
        let uid = new.uid.clone();
        store.create(new).await.expect(name);

        for _ in 0..3 {
            let note = store.fetch_and_consume(&uid).await.expect(name);
            assert_eq!(note.title, "T", "{name}");
            assert_eq!(note.note, "B", "{name}");
        }

        tokio::time::sleep(StdDuration::from_millis(600)).await;

        for _ in 0..2 {
            assert!(
                matches!(store.fetch_and_consume(&uid).await, Err(NoteError::NotFound)),
                "{name}: expired note must not be returned"
            );
        }
    }
}

#[tokio::test]
async fn duplicate_uid_keeps_existing_record() {
    for (name, store, _tmp) in all_stores().await {
        let original = NewNote {
            expires: Some(Utc::now() + Duration::minutes(5)),
            ..single_use("first", "original body")
        };
        let uid = original.uid.clone();
        let created = store.create(original).await.expect(name);

        let duplicate = NewNote {
            uid: uid.clone(),
            ..single_use("second", "replacement")
        };
        assert!(
            matches!(store.create(duplicate).await, Err(NoteError::DuplicateUid)),
            "{name}"
        );

        let note = store.fetch_and_consume(&uid).await.expect(name);
        assert_eq!(note, created, "{name}");
    }
}

#[tokio::test]
async fn invalid_input_inserts_nothing() {
    for (name, store, _tmp) in all_stores().await {
        let empty_title = single_use("", "body");
        let uid = empty_title.uid.clone();
        assert!(
            matches!(store.create(empty_title).await, Err(NoteError::InvalidInput(_))),
            "{name}"
        );
        assert!(
            matches!(store.fetch_and_consume(&uid).await, Err(NoteError::NotFound)),
            "{name}"
        );

        let empty_note = single_use("title", "");
        assert!(
            matches!(store.create(empty_note).await, Err(NoteError::InvalidInput(_))),
            "{name}"
        );

        let past = NewNote {
            expires: Some(Utc::now() - Duration::seconds(1)),
            ..single_use("title", "body")
        };
        let uid = past.uid.clone();
        assert!(
            matches!(store.create(past).await, Err(NoteError::InvalidInput(_))),
            "{name}"
        );
        assert!(
            matches!(store.fetch_and_consume(&uid).await, Err(NoteError::NotFound)),
            "{name}"
        );
    }
}

#[tokio::test]
async fn internal_ids_increase() {
    for (name, store, _tmp) in all_stores().await {
        let first = store.create(single_use("a", "a")).await.expect(name);
        let second = store.create(single_use("b", "b")).await.expect(name);
        assert!(second.id > first.id, "{name}");
    }
}

#[tokio::test]
async fn prune_removes_only_expired_notes() {
    for (name, store, _tmp) in all_stores().await {
        let short = NewNote {
            expires: Some(Utc::now() + Duration::milliseconds(200)),
            ..single_use("short", "lived")
        };
        let long = NewNote {
            expires: Some(Utc::now() + Duration::hours(1)),
            ..single_use("long", "lived")
        };
        let single = single_use("single", "use");
        let (long_uid, single_uid) = (long.uid.clone(), single.uid.clone());

        store.create(short).await.expect(name);
        store.create(long).await.expect(name);
        store.create(single).await.expect(name);

        tokio::time::sleep(StdDuration::from_millis(400)).await;

        assert_eq!(store.prune_expired().await.expect(name), 1, "{name}");
        assert_eq!(store.prune_expired().await.expect(name), 0, "{name}");

        assert!(store.fetch_and_consume(&long_uid).await.is_ok(), "{name}");
        assert!(store.fetch_and_consume(&single_uid).await.is_ok(), "{name}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_of_single_use_note_succeed_once() {
    const READERS: usize = 16;

    for (name, store, _tmp) in all_stores().await {
        let new = single_use("race", "only one wins");
        let uid = new.uid.clone();
        store.create(new).await.expect(name);

        let mut readers = Vec::with_capacity(READERS);
        for _ in 0..READERS {
            let store = store.clone();
            let uid = uid.clone();
            readers.push(tokio::spawn(async move {
                store.fetch_and_consume(&uid).await
            }));
        }

        let mut successes = 0;
        let mut not_found = 0;
        for reader in readers {
            match reader.await.expect("reader task panicked") {
                Ok(note) => {
                    assert_eq!(note.note, "only one wins", "{name}");
                    successes += 1;
                }
                Err(NoteError::NotFound) => not_found += 1,
                Err(other) => panic!("{name}: unexpected error {other}"),
            }
        }

        assert_eq!(successes, 1, "{name}");
        assert_eq!(not_found, READERS - 1, "{name}");
    }
}

#[tokio::test]
async fn sql_store_reopens_existing_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.db");

    let new = NewNote {
        expires: Some(Utc::now() + Duration::minutes(5)),
        ..single_use("persisted", "across restarts")
    };
    let uid = new.uid.clone();
    {
        let store = SqlNoteStore::open(SqliteConnectOptions::new().filename(&path))
            .await
            .unwrap();
        store.create(new).await.unwrap();
        store.close().await;
    }

    let store = SqlNoteStore::open(SqliteConnectOptions::new().filename(&path))
        .await
        .unwrap();
    let note = store.fetch_and_consume(&uid).await.unwrap();
    assert_eq!(note.title, "persisted");
}
