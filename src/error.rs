use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::models::ApiResponse;
use crate::service::ScheduleError;

pub const INVALID_REQUEST_PREFIX: &str = "Invalid JSON request: ";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        };
        (status, Json(ApiResponse::error(msg))).into_response()
    }
}

/// Body for a handler panic caught by the router's catch-panic layer.
pub fn panic_response(_payload: Box<dyn Any + Send + 'static>) -> Response {
    error!("Handler panicked while serving a request");
    ApiError::Internal("internal server error".into()).into_response()
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::InvalidStartDate
            | ScheduleError::InvalidEndDate
            | ScheduleError::InvalidStartEndDate
            | ScheduleError::InvalidDate
            | ScheduleError::DateNotValidForClass { .. } => ApiError::BadRequest(value.to_string()),
            ScheduleError::ClassNotFound => ApiError::NotFound(value.to_string()),
            ScheduleError::ClassAlreadyExists => ApiError::Conflict(value.to_string()),
            ScheduleError::Internal => {
                error!("Request failed with an internal fault");
                ApiError::Internal(value.to_string())
            }
        }
    }
}
