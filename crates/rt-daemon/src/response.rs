// response.rs — Response envelope, API errors and the caller extractor.
//
// Every route answers `{"success": true, "data": ...}` or
// `{"success": false, "error": "..."}`, including requests whose path, query
// or body does not parse. The caller is identified by the `x-user-id` header,
// which the authentication layer in front of the daemon is expected to set.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rt_directory::User;
use rt_progress::ProgressError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::AppState;

pub const CALLER_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or unknown caller id.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Path, query or body that axum could not extract.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Tracker(#[from] ProgressError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Tracker(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl From<rt_directory::DirectoryError> for ApiError {
    fn from(e: rt_directory::DirectoryError) -> Self {
        ApiError::Tracker(e.into())
    }
}

impl From<rt_curriculum::CurriculumError> for ApiError {
    fn from(e: rt_curriculum::CurriculumError) -> Self {
        ApiError::Tracker(e.into())
    }
}

macro_rules! rejected_from {
    ($($rejection:ty),*) => {$(
        impl From<$rejection> for ApiError {
            fn from(rejection: $rejection) -> Self {
                ApiError::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        }
    )*};
}

rejected_from!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request refused");
        }
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

/// The directory user making the request.
pub struct Caller(pub User);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", CALLER_HEADER)))?;
        let id = raw
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| ApiError::Unauthorized(format!("malformed {} header", CALLER_HEADER)))?;

        match state.tracker.users().get(id)? {
            Some(user) => Ok(Caller(user)),
            None => Err(ApiError::Unauthorized(format!("unknown user {}", id))),
        }
    }
}

/// `Json` whose rejection uses the envelope.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Path` whose rejection uses the envelope.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}

/// `Query` whose rejection uses the envelope.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_skip_empty_fields() {
        let ok = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 3}));

        let failed = serde_json::to_value(ApiResponse::failure("nope")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "nope"}));
    }

    #[test]
    fn tracker_errors_keep_their_status() {
        let err = ApiError::from(ProgressError::forbidden("scope"));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        let err = ApiError::Unauthorized("missing".into());
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
