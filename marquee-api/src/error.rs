use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_core::{CoreError, ErrorKind};
use serde_json::json;

use crate::metrics::METRICS;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let kind = err.kind();
        METRICS.record_rejection(kind.as_str());

        let msg = err.to_string();
        match err {
            // Ids named in the path are resources; ids in the body are arguments.
            CoreError::ShowtimeNotFound(_)
            | CoreError::BookingNotFound(_)
            | CoreError::MovieNotFound(_) => AppError::NotFoundError(msg),
            CoreError::UnknownMovie(_) | CoreError::UnknownShowtime(_) => {
                AppError::ValidationError(msg)
            }
            _ => match kind {
                ErrorKind::InvalidArgument | ErrorKind::UnknownReference => {
                    AppError::ValidationError(msg)
                }
                ErrorKind::Conflict => AppError::ConflictError(msg),
                ErrorKind::Transient => AppError::ServiceUnavailable(msg),
                ErrorKind::Internal => AppError::InternalServerError(msg),
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        METRICS.record_rejection(ErrorKind::InvalidArgument.as_str());
        AppError::ValidationError(rejection.body_text())
    }
}
