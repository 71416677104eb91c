//! Process configuration read from environment variables
//!
//! `.env` is loaded by `main` through dotenvy before [`Config::from_env`] runs.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SQLITE_URL: &str = "sqlite://notes.db";
const DEFAULT_REDB_PATH: &str = "notes.redb";
const DEFAULT_STATIC_DIR: &str = "./dist";
const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 360;

/// Storage engine selected with `NOTE_BACKEND`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Redb,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `PORT`
    pub port: u16,
    /// `NOTE_BACKEND`: `sqlite` or `redb`
    pub backend: Backend,
    /// `DATABASE_URL`: sqlx URL for sqlite, file path for redb
    pub database_url: String,
    /// `STATIC_DIR`: served under `/`; empty disables static files
    pub static_dir: Option<PathBuf>,
    /// `PRUNE_INTERVAL_SECS`: period of the expired-note cleanup
    pub prune_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let backend = match lookup("NOTE_BACKEND").as_deref() {
            None | Some("sqlite") => Backend::Sqlite,
            Some("redb") => Backend::Redb,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "NOTE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| match backend {
            Backend::Sqlite => DEFAULT_SQLITE_URL.to_string(),
            Backend::Redb => DEFAULT_REDB_PATH.to_string(),
        });

        let static_dir = match lookup("STATIC_DIR") {
            Some(dir) if dir.is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from(DEFAULT_STATIC_DIR)),
        };

        let prune_secs = match lookup("PRUNE_INTERVAL_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "PRUNE_INTERVAL_SECS",
                        value,
                    })
                }
            },
            None => DEFAULT_PRUNE_INTERVAL_SECS,
        };

        Ok(Config {
            port,
            backend,
            database_url,
            static_dir,
            prune_interval: Duration::from_secs(prune_secs),
        })
    }
}
