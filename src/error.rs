/*
 * Responsibility
 * - App-wide AppError
 * - IntoResponse (HTTP status + `{"message": ...}` JSON body)
 * - Collapse credential failures into one generic 401
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::GateError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid or expired token")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    #[error("Request timeout")]
    RequestTimeout,
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<GateError> for AppError {
    // Which check failed stays server-side; callers only ever see a 401.
    fn from(_: GateError) -> Self {
        AppError::Unauthorized
    }
}
