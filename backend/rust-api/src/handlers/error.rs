use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::QuizError;

/// HTTP face of [`QuizError`]: `{ "error": <code>, "message": <text> }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        let status = match &err {
            QuizError::NotFound(_) | QuizError::UnknownPlayer => StatusCode::NOT_FOUND,
            QuizError::Forbidden => StatusCode::FORBIDDEN,
            QuizError::InvalidSelection(_) | QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::InvalidState(_)
            | QuizError::SessionNotStarted
            | QuizError::SessionNotActive
            | QuizError::SessionNotEnded
            | QuizError::WindowClosed(_)
            | QuizError::NotYetAvailable(_)
            | QuizError::AnswersAlreadyRevealed(_) => StatusCode::CONFLICT,
            QuizError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &err {
            QuizError::Internal(inner) => {
                tracing::error!("Internal error: {:#}", inner);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        Self {
            status,
            code: err.code(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}
