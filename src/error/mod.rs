//! Application error types for robust error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single structured failure, identity-library style: a stable code plus a
/// human-readable description.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub description: String,
}

impl ErrorDetail {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Password mismatch: {0}")]
    Mismatch(String),

    #[error("Password does not meet the complexity policy")]
    WeakPassword(Vec<ErrorDetail>),

    #[error("User already registered")]
    DuplicateUser(Vec<ErrorDetail>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid reset token: {0}")]
    InvalidToken(String),

    #[error("Store failure")]
    Internal(Vec<ErrorDetail>),

    #[error("Internal error: {0}")]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Two envelope shapes: message-kind errors render
        // {isSuccess, message}; identity-style failures render
        // {isSuccess, errors: [{code, description}]}.
        match self {
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "configuration error");
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
            AppError::Serialization(e) => {
                message_response(StatusCode::BAD_REQUEST, &format!("Invalid payload: {}", e))
            }
            AppError::Validation(msg) => message_response(StatusCode::BAD_REQUEST, &msg),
            AppError::Mismatch(msg) => message_response(StatusCode::BAD_REQUEST, &msg),
            AppError::WeakPassword(errors) => error_list_response(StatusCode::BAD_REQUEST, errors),
            AppError::DuplicateUser(errors) => error_list_response(StatusCode::BAD_REQUEST, errors),
            AppError::NotFound(msg) => message_response(StatusCode::BAD_REQUEST, &msg),
            AppError::InvalidCredentials(msg) => message_response(StatusCode::UNAUTHORIZED, &msg),
            AppError::InvalidToken(msg) => message_response(StatusCode::BAD_REQUEST, &msg),
            AppError::Internal(errors) => {
                tracing::error!(?errors, "internal store failure");
                error_list_response(StatusCode::INTERNAL_SERVER_ERROR, errors)
            }
            AppError::Other(e) => {
                tracing::error!(error = %e, "internal error");
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        }
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({ "isSuccess": false, "message": message }));
    (status, body).into_response()
}

fn error_list_response(status: StatusCode, errors: Vec<ErrorDetail>) -> Response {
    let body = Json(json!({ "isSuccess": false, "errors": errors }));
    (status, body).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
