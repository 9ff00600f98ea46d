//! # Lookup Error Types
//!
//! A lookup either misses (the product database does not know the
//! barcode) or fails (the product database could not answer). Callers treat
//! the two very differently, so they are separate variants.

use thiserror::Error;

/// Product lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The product database has no entry for this barcode.
    #[error("Product not found: {barcode}")]
    NotFound { barcode: String },

    /// The product database could not be reached or returned an error
    /// status.
    #[error("Product database unavailable: {0}")]
    Unavailable(String),

    /// No answer within the configured timeout.
    #[error("Product database timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The body was not the expected product document.
    #[error("Invalid response from product database: {0}")]
    InvalidResponse(String),
}

impl LookupError {
    /// Returns true for a definite miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }

    /// Returns true if trying again later might succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Unavailable(_) | LookupError::Timeout { .. })
    }
}

/// Result type for lookups.
pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let miss = LookupError::NotFound {
            barcode: "12345678".to_string(),
        };
        assert!(miss.is_not_found());
        assert!(!miss.is_retryable());

        assert!(LookupError::Timeout { timeout_ms: 5000 }.is_retryable());
        assert!(LookupError::Unavailable("502".to_string()).is_retryable());
        assert!(!LookupError::InvalidResponse("eof".to_string()).is_retryable());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LookupError::Timeout { timeout_ms: 250 }.to_string(),
            "Product database timed out after 250ms"
        );
    }
}
