//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                                │
//! │  Result<T, ApiError>                                                    │
//! │       │                                                                 │
//! │       ├── policy rejected?   CoreError::Unauthorized/Forbidden ──┐     │
//! │       ├── validation?        CoreError::Validation ──────────────┤     │
//! │       ├── lookup miss?       DbError::NotFound ──────────────────┤     │
//! │       ├── duplicate line?    DbError::UniqueViolation ───────────┤     │
//! │       ├── still ordered?     DbError::Referenced ────────────────┤     │
//! │       └── storage failure?   DbError::* (logged, generic text) ──┤     │
//! │                                                                  ▼     │
//! │                                      ApiError { code, message }        │
//! │                                      + HTTP status from code           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! { "code": "CONFLICT", "message": "Item already in cart" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lemon_core::{CoreError, ValidationError};
use lemon_db::{DbError, DUPLICATE_CART_LINE};
use serde::Serialize;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Request cannot be satisfied in the current state, e.g. empty cart (400)
    BadRequest,

    /// No valid credentials (401)
    Unauthorized,

    /// Authenticated but not permitted (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Duplicate resource (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub const fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                if field == DUPLICATE_CART_LINE {
                    ApiError::new(ErrorCode::Conflict, "Item already in cart")
                } else {
                    ApiError::new(
                        ErrorCode::Conflict,
                        format!("{} '{}' already exists", field, value),
                    )
                }
            }
            DbError::Domain(e) => e.into(),
            DbError::Referenced { entity, id } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} {} is part of an existing order", entity, id),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            CoreError::EmptyCart => ApiError::new(ErrorCode::BadRequest, "Your cart is empty"),
            CoreError::AmountOverflow { .. } => ApiError::validation(err.to_string()),
            CoreError::Unauthorized => ApiError::new(ErrorCode::Unauthorized, err.to_string()),
            CoreError::Forbidden { .. } => ApiError::new(ErrorCode::Forbidden, err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use lemon_core::Operation;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(CoreError::EmptyCart), StatusCode::BAD_REQUEST),
            (ApiError::from(CoreError::Unauthorized), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(CoreError::Forbidden {
                    operation: Operation::DeleteOrder,
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(DbError::not_found("Order", "x")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(DbError::duplicate(DUPLICATE_CART_LINE, "m1")),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(DbError::Referenced {
                    entity: "Menu item".to_string(),
                    id: "m1".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(CoreError::from(ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                })),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(DbError::QueryFailed("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{}", err);
        }
    }

    #[test]
    fn test_conflict_messages() {
        let err = ApiError::from(DbError::duplicate(DUPLICATE_CART_LINE, "m1"));
        assert_eq!(err.message, "Item already in cart");

        let err = ApiError::from(DbError::duplicate("slug", "mains"));
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "slug 'mains' already exists");
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err = ApiError::from(DbError::Internal("secret path /var/db".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("/var/db"));
    }

    #[test]
    fn test_domain_error_unwraps() {
        let err = ApiError::from(DbError::Domain(CoreError::EmptyCart));
        assert_eq!(err.code, ErrorCode::BadRequest);
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::new(ErrorCode::NotFound, "x")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "x");
    }
}
