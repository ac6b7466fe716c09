//! Error types for Biblionacho server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    Duplicate = 5,
    BadValue = 6,
    InvalidDateRange = 7,
    ActiveLoanExists = 8,
    RoleNotPermitted = 9,
    BusinessRule = 10,
}

/// Which bound of a date range was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBound {
    /// The start date comes after the end date
    StartAfterEnd,
    /// The start date is before today
    StartInPast,
    /// The range spans more days than a single window may cover
    TooLong,
    /// A date falls outside the supported calendar
    OutOfRange,
}

impl std::fmt::Display for DateBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateBound::StartAfterEnd => write!(f, "start date cannot be after end date"),
            DateBound::StartInPast => write!(f, "start date must be on or after the current date"),
            DateBound::TooLong => write!(f, "range may not exceed {} days", crate::calendar::MAX_WINDOW_DAYS),
            DateBound::OutOfRange => write!(f, "date is outside the supported calendar"),
        }
    }
}

/// Lending rule violations raised by the due-date calculator and the
/// borrowing-eligibility check. Never logged at the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LendingError {
    #[error("Invalid date range: {bound}")]
    InvalidDateRange { bound: DateBound },

    #[error("User {borrower_id} already has a book that has not been returned")]
    ActiveLoanExists { borrower_id: i64 },

    #[error("No lending role matches [{}]", .roles.join(", "))]
    RoleNotPermitted { roles: Vec<String> },
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error(transparent)]
    Lending(#[from] LendingError),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // 23505: unique_violation
        if let sqlx::Error::Database(ref db) = e {
            if db.code().as_deref() == Some("23505") {
                let constraint = db.constraint().unwrap_or("unique constraint");
                return AppError::Conflict(format!("Duplicate value violates {}", constraint));
            }
        }
        AppError::Database(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
            AppError::BusinessRule(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BusinessRule),
            AppError::Lending(LendingError::InvalidDateRange { .. }) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidDateRange)
            }
            AppError::Lending(LendingError::ActiveLoanExists { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ActiveLoanExists)
            }
            AppError::Lending(LendingError::RoleNotPermitted { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::RoleNotPermitted)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::BusinessRule(msg) => msg.clone(),
            AppError::Lending(e) => e.to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
