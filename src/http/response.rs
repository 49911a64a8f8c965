//! Error-to-response mapping.
//!
//! # Design Decisions
//! - Every error body is `{ "error": message }`
//! - Engine results are never errors; only lookups and bad input are

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::session::SessionError;
use crate::teaching::QuizError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::LimitReached(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Quiz(QuizError::Finished) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::nil();
        assert_eq!(ApiError::from(SessionError::NotFound(id)).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(SessionError::LimitReached(1)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::from(QuizError::Finished).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_message_passes_through() {
        let err = ApiError::from(SessionError::LimitReached(3));
        assert_eq!(err.to_string(), "session limit of 3 reached");
    }
}
