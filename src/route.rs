//! Route definitions for the note API

use std::path::Path;

use axum::handler::HandlerWithoutStateExt;
use axum::response::Redirect;
use axum::routing::post;
use axum::Router;
use tower_http::services::ServeDir;

use crate::database::AppState;
use crate::handler::{create_note, get_note};

/// Creates the application router
///
/// # Route Definitions
///
/// - `POST /api/create` - Creates a note
/// - `POST /api/get` - Reads (and possibly consumes) a note
/// - everything else - files from `static_dir`, when given; `/` serves its
///   `index.html` and unknown paths redirect to `/`
pub fn create_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let api_routes = Router::new()
        .route("/create", post(create_note))
        .route("/get", post(get_note));

    let app = Router::new().nest("/api", api_routes).with_state(state);

    match static_dir {
        Some(dir) => {
            // `fallback` keeps the redirect status; `not_found_service` would force a 404.
            let static_files = ServeDir::new(dir).fallback(redirect_home.into_service());
            app.fallback_service(static_files)
        }
        None => app,
    }
}

async fn redirect_home() -> Redirect {
    Redirect::to("/")
}
