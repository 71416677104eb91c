//! Relational note store backed by SQLite through sqlx

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::{validate, NoteStore};
use crate::error::NoteError;
use crate::model::{NewNote, Note};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uid TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        note TEXT NOT NULL,
        created TIMESTAMP NOT NULL,
        expires TIMESTAMP
    )";

const MAX_CONNECTIONS: u32 = 8;

/// Note store over a single `notes` table
#[derive(Clone)]
pub struct SqlNoteStore {
    pool: SqlitePool,
}

impl SqlNoteStore {
    /// Connects to a database URL such as `sqlite://notes.db`, creating the
    /// file and the table when they do not exist yet.
    pub async fn connect(url: &str) -> Result<Self, NoteError> {
        let options = SqliteConnectOptions::from_str(url)?;
        Self::open(options).await
    }

    pub async fn open(options: SqliteConnectOptions) -> Result<Self, NoteError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        Ok(SqlNoteStore { pool })
    }
}

#[async_trait]
impl NoteStore for SqlNoteStore {
    async fn create(&self, new: NewNote) -> Result<Note, NoteError> {
        let created = Utc::now();
        validate(&new, created)?;

        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (uid, title, note, created, expires)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, uid, title, note, created, expires",
        )
        .bind(&new.uid)
        .bind(&new.title)
        .bind(&new.note)
        .bind(created)
        .bind(new.expires)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(uid = %note.uid, single_use = note.is_single_use(), "note created");
        Ok(note)
    }

    async fn fetch_and_consume(&self, uid: &str) -> Result<Note, NoteError> {
        // Single-use notes: the delete is the read, so only one caller gets a row back.
        let consumed = sqlx::query_as::<_, Note>(
            "DELETE FROM notes WHERE uid = ? AND expires IS NULL
             RETURNING id, uid, title, note, created, expires",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(note) = consumed {
            tracing::debug!(uid, "single-use note consumed");
            return Ok(note);
        }

        let timed = sqlx::query_as::<_, Note>(
            "SELECT id, uid, title, note, created, expires
             FROM notes WHERE uid = ? AND expires IS NOT NULL",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        let Some(note) = timed else {
            return Err(NoteError::NotFound);
        };

        if note.is_expired_at(Utc::now()) {
            sqlx::query("DELETE FROM notes WHERE id = ?")
                .bind(note.id)
                .execute(&self.pool)
                .await?;
            tracing::debug!(uid, "expired note removed on read");
            return Err(NoteError::NotFound);
        }

        Ok(note)
    }

    async fn prune_expired(&self) -> Result<u64, NoteError> {
        let result = sqlx::query(
            "DELETE FROM notes
             WHERE expires IS NOT NULL AND julianday(expires) <= julianday(?)",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
