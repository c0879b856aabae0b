//! # API Error Types
//!
//! The outermost error layer: everything a handler can fail with, mapped to
//! an HTTP status and a uniform `{"error": "..."}` JSON body.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiError variant        Status   Notes                                 │
//! │  ──────────────────      ──────   ─────────────────────────────────     │
//! │  Validation / BadRequest   400    rejected before touching storage      │
//! │  Unauthorized              401    missing, stale, or invalid session    │
//! │  NotFound                  404    ALSO covers "exists but not yours":   │
//! │                                   non-owners get the same shape so      │
//! │                                   existence is never disclosed          │
//! │  Duplicate                 409    username/email already registered     │
//! │  Internal                  500    storage or hashing failure            │
//! │  Delivery                  502    reset-code mail could not be handed   │
//! │                                   off to the mailer                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use invoice_core::ValidationError;
use invoice_db::DbError;

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Business rule violation in the request.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed request: unknown action, unparseable body.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid authentication.
    #[error("{0}")]
    Unauthorized(String),

    /// Entity missing, or present but owned by someone else.
    #[error("{0} not found")]
    NotFound(String),

    /// Unique field already taken.
    #[error("{field} is already registered")]
    Duplicate { field: String },

    /// Reset-code mail handoff failed.
    #[error("could not deliver reset code")]
    Delivery(String),

    /// Storage or other internal failure. Details are logged, not leaked.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for a 401 with the standard message.
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("authentication required".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Duplicate { .. } => StatusCode::CONFLICT,
            ApiError::Delivery(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal detail goes to the log; the client gets a generic message
        if let ApiError::Internal(ref detail) = self {
            error!(%detail, "Internal error");
        }
        if let ApiError::Delivery(ref detail) = self {
            error!(%detail, "Reset-code delivery failed");
        }

        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::NotFound(entity),
            DbError::UniqueViolation { field } => ApiError::Duplicate { field },
            DbError::Validation(e) => ApiError::Validation(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let api: ApiError = DbError::not_found("Invoice", "x").into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);

        let api: ApiError = DbError::UniqueViolation {
            field: "email".to_string(),
        }
        .into();
        assert_eq!(api.status(), StatusCode::CONFLICT);

        let api: ApiError = DbError::QueryFailed("boom".to_string()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let api = ApiError::Internal("connection string with secrets".to_string());
        assert_eq!(api.to_string(), "internal server error");
    }
}
