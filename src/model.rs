//! Data models for the note service
//!
//! This module defines the stored note record, the input to a create
//! operation, and the request/response bodies of the HTTP API.

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::NoteError;

/// A note as stored by a backend
///
/// `expires == None` marks a single-use note, consumed by its first read.
/// A timed note stays readable until `expires`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Note {
    /// Internal sequence number assigned by the backend, never sent to clients
    pub id: i64,

    /// Externally visible identifier
    pub uid: String,

    pub title: String,

    /// Body of the note
    pub note: String,

    /// Insertion time
    pub created: DateTime<Utc>,

    /// Expiration instant, or `None` for a single-use note
    pub expires: Option<DateTime<Utc>>,
}

impl Note {
    pub fn is_single_use(&self) -> bool {
        self.expires.is_none()
    }

    /// True once a timed note has reached its expiration instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires, Some(expires) if expires <= now)
    }
}

/// Input of [`NoteStore::create`](crate::store::NoteStore::create)
#[derive(Debug, Clone)]
pub struct NewNote {
    pub uid: String,
    pub title: String,
    pub note: String,
    pub expires: Option<DateTime<Utc>>,
}

/// Expiration presets offered by the web client
///
/// Mode 0 is a single-use note; modes 1 to 5 keep the note for
/// 5 minutes, 20 minutes, 1 hour, 4 hours and 24 hours.
pub fn expiration_from_mode(
    mode: u8,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, NoteError> {
    let lifetime = match mode {
        0 => return Ok(None),
        1 => Duration::minutes(5),
        2 => Duration::minutes(20),
        3 => Duration::hours(1),
        4 => Duration::hours(4),
        5 => Duration::hours(24),
        _ => return Err(NoteError::invalid("Unknown expiration mode")),
    };
    Ok(Some(now + lifetime))
}

/// Request payload for `POST /api/create`
///
/// # Example
/// ```json
/// {
///   "uid": "V1StGXR8Z5jdHi6BmyT2a",  // Optional, generated when absent
///   "title": "Hello",
///   "note": "World",
///   "expires": "2026-01-17T13:40:00Z" // Optional, or "expiration": 0-5
/// }
/// ```
#[derive(Deserialize, Debug, Default)]
pub struct CreateRequest {
    pub uid: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,

    /// Absolute expiration instant
    #[serde(default, deserialize_with = "blank_as_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Expiration preset, see [`expiration_from_mode`]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub expiration: Option<u8>,
}

/// Reads an optional field that may arrive typed (JSON) or as text (forms)
///
/// A blank text value, such as the `expiration=` of an unfilled form input,
/// is treated as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Value(T),
        Text(String),
    }

    match Option::<Field<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Field::Value(value)) => Ok(Some(value)),
        Some(Field::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Field::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

/// Request payload for `POST /api/get`
#[derive(Deserialize, Debug, Default)]
pub struct GetRequest {
    pub uid: Option<String>,
}

/// JSON body returned by every API endpoint
///
/// Failures are reported in the body (`success: false`); the HTTP status is
/// always 200.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ApiResponse {
    pub fn success(note: Note) -> Self {
        ApiResponse {
            success: true,
            message: "Successful".to_string(),
            uid: Some(note.uid),
            title: Some(note.title),
            note: Some(note.note),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            uid: None,
            title: None,
            note: None,
        }
    }
}

impl From<NoteError> for ApiResponse {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::InvalidInput(message) => ApiResponse::failure(message),
            NoteError::DuplicateUid => ApiResponse::failure("A note with this uid already exists."),
            NoteError::NotFound => {
                ApiResponse::failure("The note does not exist or has expired.")
            }
            NoteError::Storage(source) => {
                tracing::error!(error = %source, "note storage failure");
                ApiResponse::failure("Internal storage error.")
            }
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
