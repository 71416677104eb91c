//! HTTP request handlers for the note API
//!
//! Both endpoints answer with HTTP 200 and an [`ApiResponse`] body; failures
//! are signalled by `"success": false` and a human-readable message.

use axum::extract::State;
use chrono::Utc;

use crate::database::AppState;
use crate::error::NoteError;
use crate::extract::Payload;
use crate::model::{expiration_from_mode, ApiResponse, CreateRequest, GetRequest, NewNote};
use crate::uid;

const MISSING_PARAMETERS: &str = "Missing Parameters";

/// Creates a note
///
/// # Request Body
///
/// ```json
/// {
///   "uid": "V1StGXR8Z5jdHi6BmyT2a",
///   "title": "Hello",
///   "note": "World",
///   "expiration": 2
/// }
/// ```
///
/// `uid` is generated when omitted. `expires` (RFC 3339) and `expiration`
/// (preset 0-5) are mutually exclusive; with neither the note is single-use.
///
/// # Response
///
/// `{"success": true, "message": "Successful", "uid", "title", "note"}` with
/// the values as stored.
pub async fn create_note(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateRequest>,
) -> ApiResponse {
    let new = match new_note_from_request(payload) {
        Ok(new) => new,
        Err(err) => return err.into(),
    };

    match state.store.create(new).await {
        Ok(note) => ApiResponse::success(note),
        Err(err) => err.into(),
    }
}

/// Reads a note, consuming it if it is single-use
///
/// # Request Body
///
/// ```json
/// { "uid": "V1StGXR8Z5jdHi6BmyT2a" }
/// ```
///
/// # Response
///
/// `{"success": true, "message": "Successful", "uid", "title", "note"}`, or
/// `{"success": false, "message": "The note does not exist or has expired."}`.
pub async fn get_note(
    State(state): State<AppState>,
    Payload(payload): Payload<GetRequest>,
) -> ApiResponse {
    let Some(uid) = payload.uid.filter(|uid| !uid.is_empty()) else {
        return ApiResponse::failure(MISSING_PARAMETERS);
    };

    match state.store.fetch_and_consume(&uid).await {
        Ok(note) => ApiResponse::success(note),
        Err(err) => err.into(),
    }
}

fn new_note_from_request(payload: CreateRequest) -> Result<NewNote, NoteError> {
    let (Some(title), Some(note)) = (payload.title, payload.note) else {
        return Err(NoteError::invalid(MISSING_PARAMETERS));
    };

    let expires = match (payload.expires, payload.expiration) {
        (Some(_), Some(_)) => {
            return Err(NoteError::invalid(
                "Only one of expires and expiration may be given",
            ))
        }
        (Some(expires), None) => Some(expires),
        (None, Some(mode)) => expiration_from_mode(mode, Utc::now())?,
        (None, None) => None,
    };

    // An empty uid counts as absent, like an empty form field.
    let uid = payload
        .uid
        .filter(|uid| !uid.is_empty())
        .unwrap_or_else(uid::generate);

    Ok(NewNote {
        uid,
        title,
        note,
        expires,
    })
}
