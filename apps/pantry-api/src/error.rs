//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Pantry API                         │
//! │                                                                         │
//! │  Handler returns Result<_, ApiError>                                   │
//! │         │                                                               │
//! │         ├── ScanError::BadBarcode        ──► 400 BAD_BARCODE           │
//! │         ├── ScanError::ProductNotFound   ──► 404 PRODUCT_NOT_FOUND     │
//! │         ├── ScanError::UpstreamUnavailable ► 500 UPSTREAM_UNAVAILABLE  │
//! │         ├── ScanError::Persistence       ──► 500 PERSISTENCE_ERROR     │
//! │         │                                    (+ data: product)          │
//! │         ├── CoreError / ValidationError  ──► 400                       │
//! │         └── DbError                      ──► 500 DATABASE_ERROR        │
//! │                                              (details logged only)      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  { "success": false, "error": "BAD_BARCODE", "message": "..." }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::scan::ScanError;
use pantry_core::{CoreError, ValidationError};
use pantry_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "success": false,
///   "error": "PRODUCT_NOT_FOUND",
///   "message": "Product not found: 12345678"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Always `false`; lets clients branch on one field for every response
    pub success: bool,

    /// Machine-readable error code for programmatic handling
    #[serde(rename = "error")]
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Payload that survived the failure (the product of a failed save)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Barcode is not 8-14 digits (400)
    BadBarcode,

    /// Malformed or contradictory request (400)
    BadRequest,

    /// Field-level validation failed (400)
    ValidationError,

    /// The product database does not know the barcode (404)
    ProductNotFound,

    /// Inventory resource not found (404)
    NotFound,

    /// The product database could not answer (500)
    UpstreamUnavailable,

    /// The product was found but could not be stored (500)
    PersistenceError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::BadBarcode | ErrorCode::BadRequest | ErrorCode::ValidationError => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::ProductNotFound | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::UpstreamUnavailable
            | ErrorCode::PersistenceError
            | ErrorCode::DatabaseError
            | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            success: false,
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches a payload to the error.
    pub fn with_data(mut self, data: Option<serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            DbError::ConstraintViolation(e) => {
                tracing::warn!("Constraint violation: {}", e);
                ApiError::new(ErrorCode::ValidationError, "Record violates a field constraint")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Decode { column, reason } => {
                tracing::error!(column = %column, "Stored record is unreadable: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BadBarcode { .. } => ApiError::new(ErrorCode::BadBarcode, err.to_string()),
            CoreError::BarcodeMismatch { .. } | CoreError::MissingSelector => {
                ApiError::bad_request(err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationError, err.to_string())
    }
}

/// Malformed JSON bodies become the standard error envelope.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Malformed query strings become the standard error envelope.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Converts scan errors to API errors.
impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::BadBarcode { .. } => ApiError::new(ErrorCode::BadBarcode, err.to_string()),
            ScanError::BadRequest(message) => ApiError::bad_request(message),
            ScanError::Validation(e) => ApiError::from(e),
            ScanError::ProductNotFound { .. } => {
                ApiError::new(ErrorCode::ProductNotFound, err.to_string())
            }
            ScanError::UpstreamUnavailable(e) => {
                tracing::error!("Product lookup failed: {}", e);
                ApiError::new(
                    ErrorCode::UpstreamUnavailable,
                    "Product database is unavailable, try again later",
                )
            }
            ScanError::Persistence { product, source } => {
                tracing::error!(barcode = %product.barcode, "Failed to save product: {}", source);
                ApiError::new(ErrorCode::PersistenceError, "Product found but could not be saved")
                    .with_data(serde_json::to_value(&*product).ok())
            }
        }
    }
}
