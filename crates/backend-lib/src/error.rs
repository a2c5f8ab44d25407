// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use blogauth_common::{ErrorBody, ErrorResponse};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {}", .0.reason())]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    /// Unknown login and wrong password are deliberately the same error
    #[error("Invalid login credentials provided")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    /// Detail stays server-side; see `public_message`
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn username_taken() -> Self {
        AppError::Conflict("Username already taken.".to_string())
    }

    pub fn email_used() -> Self {
        AppError::Conflict("Email already used.".to_string())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::InvalidToken => "AUTH_002",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Message safe to return to the caller.
    /// Validation and conflict reasons pass through; internal detail never does.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.public_message(),
            },
        };

        (status, axum::Json(body)).into_response()
    }
}
