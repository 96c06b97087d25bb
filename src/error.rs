//! Typed errors and their mapping onto the response envelope.

use crate::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Message returned to callers for anything that is not a classified failure.
pub const INTERNAL_MESSAGE: &str = "internal server error, please retry later";

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Business(String),
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    /// Envelope code for this failure.
    pub fn code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Conflict(_)
            | AppError::Business(_)
            | AppError::Validation(_)
            | AppError::BadRequest(_) => 400,
            AppError::Db(e) if is_unique_violation(e) => 400,
            AppError::Config(_) | AppError::Db(_) | AppError::Internal(_) => 500,
        }
    }

    /// Message shown to the caller. Internal details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Db(e) if is_unique_violation(e) => {
                "duplicate value violates a unique constraint".to_string()
            }
            AppError::Config(_) | AppError::Db(_) | AppError::Internal(_) => {
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        match code {
            500 => tracing::error!(error = %self, "unhandled failure"),
            404 => tracing::warn!(error = %self, "resource not found"),
            _ => tracing::warn!(error = %self, "request rejected"),
        }
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ApiResponse<()> = ApiResponse::failure(code, self.public_message());
        (status, Json(body)).into_response()
    }
}
