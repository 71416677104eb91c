//! Embedded note store backed by redb
//!
//! Notes live in a single table keyed by uid, with the JSON-serialized
//! [`Note`] as value. A second table holds the id sequence.
//!
//! redb allows one write transaction at a time, so every mutating operation
//! (including the read-check-delete of a single-use note) runs inside one
//! write transaction and is atomic with respect to concurrent callers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};

use super::{validate, NoteStore};
use crate::error::NoteError;
use crate::model::{NewNote, Note};

/// Key: note uid. Value: JSON-serialized [`Note`].
pub const TABLE_NOTES: TableDefinition<&str, &str> = TableDefinition::new("notes_v1");

/// Key: counter name. Value: last value handed out.
pub const TABLE_META: TableDefinition<&str, u64> = TableDefinition::new("meta_v1");

const NOTE_ID_SEQUENCE: &str = "note_id";

#[derive(Clone)]
pub struct RedbNoteStore {
    db: Arc<Database>,
}

impl RedbNoteStore {
    /// Creates or opens the database file and makes sure both tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NoteError> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(TABLE_NOTES)?;
            write_txn.open_table(TABLE_META)?;
        }
        write_txn.commit()?;

        Ok(RedbNoteStore { db: Arc::new(db) })
    }

    fn create_blocking(db: &Database, new: NewNote) -> Result<Note, NoteError> {
        let created = Utc::now();
        validate(&new, created)?;

        let write_txn = db.begin_write()?;
        let note = {
            let mut notes = write_txn.open_table(TABLE_NOTES)?;
            if notes.get(new.uid.as_str())?.is_some() {
                return Err(NoteError::DuplicateUid);
            }

            let mut meta = write_txn.open_table(TABLE_META)?;
            let last_id = meta
                .get(NOTE_ID_SEQUENCE)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let id = last_id + 1;
            meta.insert(NOTE_ID_SEQUENCE, id)?;

            let note = Note {
                id: id as i64,
                uid: new.uid,
                title: new.title,
                note: new.note,
                created,
                expires: new.expires,
            };
            let record_json = serde_json::to_string(&note)?;
            notes.insert(note.uid.as_str(), record_json.as_str())?;
            note
        };
        write_txn.commit()?;

        tracing::debug!(uid = %note.uid, single_use = note.is_single_use(), "note created");
        Ok(note)
    }

    fn fetch_and_consume_blocking(db: &Database, uid: &str) -> Result<Note, NoteError> {
        let write_txn = db.begin_write()?;
        let result = {
            let mut notes = write_txn.open_table(TABLE_NOTES)?;
            let stored = match notes.get(uid)? {
                Some(guard) => Some(serde_json::from_str::<Note>(guard.value())?),
                None => None,
            };

            match stored {
                None => Err(NoteError::NotFound),
                Some(note) if note.is_expired_at(Utc::now()) => {
                    notes.remove(uid)?;
                    tracing::debug!(uid, "expired note removed on read");
                    Err(NoteError::NotFound)
                }
                Some(note) => {
                    if note.is_single_use() {
                        notes.remove(uid)?;
                        tracing::debug!(uid, "single-use note consumed");
                    }
                    Ok(note)
                }
            }
        };
        write_txn.commit()?;

        result
    }

    fn prune_expired_blocking(db: &Database) -> Result<u64, NoteError> {
        let now = Utc::now();
        let write_txn = db.begin_write()?;
        let removed = {
            let mut notes = write_txn.open_table(TABLE_NOTES)?;

            let mut expired = Vec::new();
            for entry in notes.iter()? {
                let (key, value) = entry?;
                let note = serde_json::from_str::<Note>(value.value())?;
                if note.is_expired_at(now) {
                    expired.push(key.value().to_string());
                }
            }

            for uid in &expired {
                notes.remove(uid.as_str())?;
            }
            expired.len() as u64
        };
        write_txn.commit()?;

        Ok(removed)
    }
}

#[async_trait]
impl NoteStore for RedbNoteStore {
    async fn create(&self, new: NewNote) -> Result<Note, NoteError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || Self::create_blocking(&db, new)).await?
    }

    async fn fetch_and_consume(&self, uid: &str) -> Result<Note, NoteError> {
        let db = self.db.clone();
        let uid = uid.to_string();
        tokio::task::spawn_blocking(move || Self::fetch_and_consume_blocking(&db, &uid)).await?
    }

    async fn prune_expired(&self) -> Result<u64, NoteError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || Self::prune_expired_blocking(&db)).await?
    }
}
