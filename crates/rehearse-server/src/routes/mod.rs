//! HTTP route handlers.

pub mod code;
pub mod interviews;
pub mod llm;

use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rehearse_core::RehearseError;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Error returned by every handler; renders as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub RehearseError);

impl From<RehearseError> for ApiError {
    fn from(e: RehearseError) -> Self {
        ApiError(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(RehearseError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(RehearseError::Validation(rejection.body_text()))
    }
}

/// JSON body extractor whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections render as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RehearseError::Validation(_) | RehearseError::InvalidInterviewType(_) => {
                StatusCode::BAD_REQUEST
            }
            RehearseError::SessionNotFound(_) | RehearseError::SnippetNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RehearseError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(target: "rehearse::api", "Request failed: {}", self.0);
        }
        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Successful body: the payload's fields next to `"success": true`.
#[derive(Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub type ApiResult<T> = Result<Json<Success<T>>, ApiError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Success {
        success: true,
        data,
    }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub llm_ready: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "rehearse",
        version: env!("CARGO_PKG_VERSION"),
        llm_ready: state.manager.is_some(),
    })
}

/// The `/api` routes, without middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        // Interviews
        .route("/interviews", post(interviews::create))
        .route("/interviews/stats", get(interviews::stats))
        .route("/interviews/{id}", get(interviews::status))
        .route("/interviews/{id}/answer", post(interviews::answer))
        .route("/interviews/{id}/code", post(interviews::submit_code))
        .route("/interviews/{id}/end", post(interviews::end))
        .route("/interviews/{id}/snippets", get(code::list_session_snippets))
        .route("/interview-types", get(interviews::types))
        // Code tools
        .route("/code/validate", post(code::validate))
        .route("/code/format", post(code::format))
        .route("/code/languages", get(code::languages))
        .route("/code/snippets", post(code::store_snippet))
        .route("/code/snippets/{id}", get(code::get_snippet))
        // LLM
        .route("/llm/status", get(llm::status))
        .route("/llm/question", post(llm::question));

    Router::new().nest("/api", api_routes).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (RehearseError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                RehearseError::InvalidInterviewType("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (RehearseError::SessionNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (RehearseError::SnippetNotFound("abc".into()), StatusCode::NOT_FOUND),
            (
                RehearseError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RehearseError::Upstream("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }
}
