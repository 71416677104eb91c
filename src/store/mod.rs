//! Note storage abstraction
//!
//! [`NoteStore`] is the seam between the HTTP handlers and a storage engine.
//! Two backends conform to it:
//!
//! - [`SqlNoteStore`] keeps notes in a relational `notes` table (SQLite via sqlx)
//! - [`RedbNoteStore`] keeps notes in an embedded redb database
//!
//! Both guarantee that a single-use note is returned to at most one caller,
//! even when several requests race on the same uid.

mod embedded;
mod sql;

pub use embedded::RedbNoteStore;
pub use sql::SqlNoteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::NoteError;
use crate::model::{NewNote, Note};
use crate::uid;

/// Storage backend for notes, shared by all handlers as `Arc<dyn NoteStore>`
#[async_trait]
pub trait NoteStore: Send + Sync + 'static {
    /// Inserts a note with `created` set to the current time.
    ///
    /// Fails with [`NoteError::DuplicateUid`] if the uid is taken and with
    /// [`NoteError::InvalidInput`] if [`validate`] rejects the input. Nothing
    /// is written on failure.
    async fn create(&self, new: NewNote) -> Result<Note, NoteError>;

    /// Returns the live note for `uid`.
    ///
    /// A single-use note is deleted in the same atomic operation that reads it.
    /// Unknown and expired uids yield [`NoteError::NotFound`].
    async fn fetch_and_consume(&self, uid: &str) -> Result<Note, NoteError>;

    /// Physically removes every timed note whose expiration has passed and
    /// returns how many were removed.
    async fn prune_expired(&self) -> Result<u64, NoteError>;

    /// Releases the backend's connections.
    async fn close(&self) {}
}

/// Input rules every backend enforces before writing
pub fn validate(new: &NewNote, now: DateTime<Utc>) -> Result<(), NoteError> {
    if new.uid.is_empty() {
        return Err(NoteError::invalid("The uid must not be empty"));
    }
    if !uid::is_well_formed(&new.uid) {
        return Err(NoteError::invalid("The uid contains invalid characters"));
    }
    if new.title.is_empty() {
        return Err(NoteError::invalid("The title must not be empty"));
    }
    if new.note.is_empty() {
        return Err(NoteError::invalid("The note must not be empty"));
    }
    if let Some(expires) = new.expires {
        if expires <= now {
            return Err(NoteError::invalid("The expiration must be in the future"));
        }
    }
    Ok(())
}
