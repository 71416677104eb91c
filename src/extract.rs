//! Request body extractor accepting JSON or urlencoded forms

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::model::ApiResponse;

/// Deserializes the body as a form when the request says so, as JSON otherwise
///
/// Rejections are reported as a regular `{"success": false}` body.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|rejection| {
                tracing::debug!(%rejection, "rejected form body");
                ApiResponse::failure("Invalid form data")
            })?;
            Ok(Payload(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
                tracing::debug!(%rejection, "rejected JSON body");
                ApiResponse::failure("Invalid JSON")
            })?;
            Ok(Payload(value))
        }
    }
}
