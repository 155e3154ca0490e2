// Request extraction
//
// Axum's own rejections answer plain text; these wrappers keep every error
// inside the JSON envelope the frontend expects.
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body extractor that reports malformed bodies through the standard
/// error envelope instead of axum's plain-text rejection.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(match rejection {
                JsonRejection::JsonDataError(err) => ApiError::invalid_json(err.body_text()),
                JsonRejection::JsonSyntaxError(err) => ApiError::invalid_json(err.body_text()),
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::invalid_json("Expected a JSON request body")
                }
                other => ApiError::invalid_json(other.body_text()),
            }),
        }
    }
}

/// Path id extractor for the `/:id` routes.
pub struct ValidId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(ValidId(id)),
            Err(_) => Err(ApiError::bad_request("Invalid id")),
        }
    }
}
