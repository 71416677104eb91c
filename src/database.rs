//! Store initialization and shared application state

use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::error::NoteError;
use crate::store::{NoteStore, RedbNoteStore, SqlNoteStore};

/// Application state shared across all request handlers
///
/// The store is owned here and handed to handlers through axum's `State`;
/// nothing reaches it through globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
}

impl AppState {
    pub fn new(store: impl NoteStore) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}

/// Opens the backend selected by `config`
pub async fn open_store(config: &Config) -> Result<Arc<dyn NoteStore>, NoteError> {
    let store: Arc<dyn NoteStore> = match config.backend {
        Backend::Sqlite => Arc::new(SqlNoteStore::connect(&config.database_url).await?),
        Backend::Redb => Arc::new(RedbNoteStore::open(&config.database_url)?),
    };
    tracing::info!(backend = ?config.backend, database = %config.database_url, "note store opened");
    Ok(store)
}
