//! Error types shared by the note store and the HTTP layer
//!
//! Storage backends convert their driver errors into [`NoteError`]; the
//! handlers turn every [`NoteError`] into a `{"success": false}` body.

use std::error::Error as StdError;

use thiserror::Error;

/// Failures of a note store operation
#[derive(Debug, Error)]
pub enum NoteError {
    /// Malformed or missing input (empty title, expiry in the past, ...)
    #[error("{0}")]
    InvalidInput(String),

    /// Another note already uses the requested uid
    #[error("a note with this uid already exists")]
    DuplicateUid,

    /// No live note for the uid, including notes that have expired
    #[error("the note does not exist or has expired")]
    NotFound,

    /// The backend is unavailable or failed unexpectedly
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),
}

impl NoteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        NoteError::InvalidInput(message.into())
    }

    pub fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        NoteError::Storage(Box::new(err))
    }
}

impl From<sqlx::Error> for NoteError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => NoteError::DuplicateUid,
            other => NoteError::storage(other),
        }
    }
}

impl From<serde_json::Error> for NoteError {
    fn from(err: serde_json::Error) -> Self {
        NoteError::storage(err)
    }
}

impl From<tokio::task::JoinError> for NoteError {
    fn from(err: tokio::task::JoinError) -> Self {
        NoteError::storage(err)
    }
}

// redb reports each stage (open, begin, table, read/write, commit) with its
// own error type; all of them are storage failures here.
macro_rules! redb_storage_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for NoteError {
                fn from(err: $ty) -> Self {
                    NoteError::storage(redb::Error::from(err))
                }
            }
        )*
    };
}

redb_storage_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Invalid process configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
