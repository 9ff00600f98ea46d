//! # Validation Module
//!
//! Input validation for scanned barcodes and inventory records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Scanner UI                                                   │
//! │  └── Camera decode, keyboard wedge input                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API route (Rust)                                             │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: barcode, date, nutrient and paging rules             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK constraints on nutrients and quantity                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pantry_core::validation::{parse_iso_date, validate_barcode};
//!
//! assert_eq!(validate_barcode(" 3017620422003\n").unwrap(), "3017620422003");
//! assert!(validate_barcode("12345").is_err());
//!
//! assert!(parse_iso_date("2024-12-31").is_some());
//! assert!(parse_iso_date("2024-02-30").is_none());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::{
    BARCODE_MAX_LEN, BARCODE_MIN_LEN, DEFAULT_EXPIRING_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
    DEFAULT_SEARCH_LIMIT, MAX_EXPIRING_DAYS, MAX_FOOD_NAME_LEN, MAX_SEARCH_LIMIT,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text search.
const MAX_SEARCH_TEXT_LEN: usize = 100;

// =============================================================================
// Barcode
// =============================================================================

/// Validates a scanned or typed barcode.
///
/// ## Rules
/// - Surrounding whitespace is ignored (keyboard-wedge scanners send `\n`)
/// - Must be 8 to 14 characters long
/// - Must contain only ASCII digits
///
/// ## Returns
/// The trimmed barcode.
///
/// ## Barcode Formats Accepted
/// - EAN-8: 8 digits
/// - UPC-A: 12 digits
/// - EAN-13: 13 digits
/// - GTIN-14: 14 digits
pub fn validate_barcode(raw: &str) -> ValidationResult<String> {
    let barcode = raw.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    if barcode.len() < BARCODE_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "barcode".to_string(),
            min: BARCODE_MIN_LEN,
        });
    }

    if barcode.len() > BARCODE_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: BARCODE_MAX_LEN,
        });
    }

    Ok(barcode.to_string())
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a strict ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// Returns `None` unless the input has exactly that shape, names a real
/// calendar day, and formats back to the identical string. `"2024-02-30"`,
/// `"2024-2-3"` and `"31/12/2024"` are all rejected.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    (date.format("%Y-%m-%d").to_string() == raw).then_some(date)
}

/// Validates an expiry date string supplied by a client.
pub fn validate_expiry_date(raw: &str) -> ValidationResult<NaiveDate> {
    parse_iso_date(raw.trim()).ok_or_else(|| ValidationError::InvalidFormat {
        field: "expiry_date".to_string(),
        reason: "must be a valid YYYY-MM-DD date".to_string(),
    })
}

// =============================================================================
// Record Fields
// =============================================================================

/// Validates a food name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_food_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_FOOD_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_FOOD_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional decimal nutrient value (grams per 100g).
///
/// Absent is fine; present values must be finite and not negative.
pub fn validate_nutrient(field: &str, value: Option<f64>) -> ValidationResult<()> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        }),
        Some(v) if v < 0.0 => Err(ValidationError::Negative {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates optional calories (kcal per 100g).
pub fn validate_calories(value: Option<i64>) -> ValidationResult<()> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::Negative {
            field: "calories".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a stored quantity.
///
/// Zero is allowed: an emptied item stays on the shelf list until deleted.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a record id (UUID).
pub fn validate_record_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Validates a free-text search.
///
/// ## Returns
/// `None` for a blank query, otherwise the trimmed text.
pub fn validate_search_text(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.is_empty() {
        return Ok(None);
    }

    if query.chars().count() > MAX_SEARCH_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_TEXT_LEN,
        });
    }

    Ok(Some(query.to_string()))
}

/// Resolves a requested page size.
///
/// Missing → 100. Clamped into `1..=1000`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT)
}

/// Resolves a requested offset. Missing or negative → 0.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Validates the look-ahead window of the expiring-items query.
pub fn validate_expiring_days(days: Option<i64>) -> ValidationResult<i64> {
    let days = days.unwrap_or(DEFAULT_EXPIRING_DAYS);

    if !(1..=MAX_EXPIRING_DAYS).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 1,
            max: MAX_EXPIRING_DAYS,
        });
    }

    Ok(days)
}

/// Validates the quantity threshold of the low-stock query.
pub fn validate_low_stock_threshold(threshold: Option<i64>) -> ValidationResult<i64> {
    let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

    if threshold < 0 {
        return Err(ValidationError::Negative {
            field: "threshold".to_string(),
        });
    }

    Ok(threshold)
}

// =============================================================================
// Unit Tests
// =============================================================================
