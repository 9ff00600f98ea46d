//! # Error Types
//!
//! Domain-specific error types for pantry-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pantry-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  pantry-db errors      └── DbError      - Inventory store failures     │
//! │  pantry-lookup errors  └── LookupError  - Upstream source failures     │
//! │                                                                         │
//! │  pantry-api errors                                                     │
//! │  └── ApiError         - What the client sees ({success:false, ...})    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → JSON response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Barcode is not 8-14 ASCII digits.
    ///
    /// ## When This Occurs
    /// - Scanner misread (partial code, stray characters)
    /// - Operator typed letters or a too-short number
    /// - Manual create with a malformed barcode
    #[error("Invalid barcode '{barcode}': {reason}")]
    BadBarcode { barcode: String, reason: String },

    /// A resubmitted product does not belong to the barcode in the request.
    #[error("Product barcode {actual} does not match requested barcode {expected}")]
    BarcodeMismatch { expected: String, actual: String },

    /// Delete was called without an `id` or a `barcode`.
    #[error("Either id or barcode is required")]
    MissingSelector,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything reaches the store or the upstream source.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-digit barcode, impossible date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BadBarcode {
            barcode: "12ab".to_string(),
            reason: "must contain only digits".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid barcode '12ab': must contain only digits"
        );

        assert_eq!(
            CoreError::MissingSelector.to_string(),
            "Either id or barcode is required"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");
        assert_eq!(err.field(), "barcode");

        let err = ValidationError::Negative {
            field: "protein".to_string(),
        };
        assert_eq!(err.to_string(), "protein must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
