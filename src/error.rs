//! Error taxonomy shared by every engine operation.
//!
//! Each error is scoped to the failing request; none is fatal to the process.
//! `Conflict` is the only retryable variant, and retrying is always the
//! caller's decision.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use sea_orm::DbErr;
use serde::Serialize;

#[derive(Debug, Display)]
pub enum ServiceError {
    /// Malformed input: blank reason, empty message content, etc.
    #[display(fmt = "{}", _0)]
    Validation(String),
    /// The caller's role does not permit this operation.
    #[display(fmt = "Insufficient role for this action")]
    PermissionDenied,
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    /// State machine violation, e.g. resolving an already-resolved case.
    /// The caller must re-fetch current state.
    #[display(fmt = "{}", _0)]
    InvalidTransition(String),
    /// Lock contention on the target row. Safe to retry.
    #[display(fmt = "Target is locked by a concurrent operation, retry later")]
    Conflict,
    #[display(fmt = "Internal server error")]
    Database(DbErr),
}

impl ServiceError {
    /// Stable machine-readable code carried in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::PermissionDenied => "permission_denied",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::InvalidTransition(_) => "invalid_transition",
            ServiceError::Conflict => "conflict",
            ServiceError::Database(_) => "internal_error",
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        // Postgres reports an expired lock_timeout as SQLSTATE 55P03. DbErr
        // only exposes the rendered message, so match the SQLSTATE code
        // embedded in it; codes are fixed five-character tokens and are not
        // localized, unlike the "lock timeout" phrase kept as a fallback for
        // driver messages that omit the code.
        let msg = err.to_string();
        if msg.contains("55P03") || msg.contains("lock timeout") {
            ServiceError::Conflict
        } else {
            ServiceError::Database(err)
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::PermissionDenied => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidTransition(_) => StatusCode::CONFLICT,
            ServiceError::Conflict => StatusCode::CONFLICT,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Database(err) = self {
            log::error!("Database error: {}", err);
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code(),
            message: self.to_string(),
        })
    }
}
