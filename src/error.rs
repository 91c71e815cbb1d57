use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::model::leave_request::{Category, LeaveRequest};

/// Every failure the service reports back to a caller.
///
/// All variants except `Database` and `Internal` are user-correctable and
/// carry enough detail for the presentation layer to explain what to fix.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(
        fmt = "overlaps {} {} request #{} ({} to {})",
        "_0.status",
        "_0.category",
        "_0.id",
        "_0.start_date",
        "_0.end_date"
    )]
    Conflict(Box<LeaveRequest>),

    #[display(
        fmt = "requested {} {} of {} but only {} remain",
        requested,
        "category.unit()",
        category,
        remaining
    )]
    QuotaExceeded {
        category: Category,
        requested: f64,
        remaining: f64,
    },

    #[display(fmt = "{}", _0)]
    DependencyViolation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Authorization(String),

    #[display(fmt = "{}", _0)]
    Unauthenticated(String),

    #[display(fmt = "{}", _0)]
    Internal(String),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl AppError {
    /// Stable machine-readable code for the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::QuotaExceeded { .. } => "quota_exceeded",
            AppError::DependencyViolation(_) => "dependency_violation",
            AppError::NotFound(_) => "not_found",
            AppError::Authorization(_) => "forbidden",
            AppError::Unauthenticated(_) => "unauthorized",
            AppError::Internal(_) | AppError::Database(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::DependencyViolation(_) => StatusCode::CONFLICT,
            AppError::QuotaExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Conflict(existing) => json!({
                "error": self.code(),
                "message": self.to_string(),
                "conflict": {
                    "id": existing.id,
                    "category": existing.category,
                    "status": existing.status,
                    "start_date": existing.start_date,
                    "end_date": existing.end_date,
                    "half_day": existing.half_day,
                }
            }),
            AppError::QuotaExceeded {
                category,
                requested,
                remaining,
            } => json!({
                "error": self.code(),
                "message": self.to_string(),
                "category": category,
                "requested": requested,
                "remaining": remaining,
                "unit": category.unit(),
            }),
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database failure");
                json!({
                    "error": self.code(),
                    "message": "Internal Server Error",
                })
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal failure");
                json!({
                    "error": self.code(),
                    "message": "Internal Server Error",
                })
            }
            _ => json!({
                "error": self.code(),
                "message": self.to_string(),
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
