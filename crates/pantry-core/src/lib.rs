//! # pantry-core: Pure Logic for the Pantry Scanner
//!
//! This crate holds everything about a scanned product that can be decided
//! without touching a network socket or a database file.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pantry Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Scanner UI (camera / keyboard)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ POST /api/scan                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pantry-api (axum)                            │   │
//! │  │    ScanService, inventory routes                                │   │
//! │  └──────────┬──────────────────┬─────────────────────┬─────────────┘   │
//! │             │                  │                     │                  │
//! │  ┌──────────▼────────┐ ┌───────▼────────┐ ┌──────────▼──────────┐     │
//! │  │ ★ pantry-core ★   │ │ pantry-lookup  │ │     pantry-db       │     │
//! │  │ validation        │ │ Open Food      │ │ food_items table    │     │
//! │  │ normalize         │ │ Facts client   │ │ search / delete     │     │
//! │  │ types             │ │                │ │                     │     │
//! │  └───────────────────┘ └────────────────┘ └─────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Inventory records, processed products, scan modes, filters
//! - [`normalize`] - Upstream product payload → [`ProcessedProduct`]
//! - [`validation`] - Barcode, date, nutrient and paging rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pantry_core::normalize::{normalize, ExternalProduct};
//! use pantry_core::validation::validate_barcode;
//!
//! let barcode = validate_barcode("3017620422003").unwrap();
//!
//! let external = ExternalProduct {
//!     product_name: Some("Nutella".to_string()),
//!     categories: Some("Spreads, Sweet spreads".to_string()),
//!     ..Default::default()
//! };
//!
//! let product = normalize(&barcode, external);
//! assert_eq!(product.name.as_deref(), Some("Nutella"));
//! assert_eq!(
//!     product.categories,
//!     Some(vec!["Spreads".to_string(), "Sweet spreads".to_string()])
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod normalize;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use normalize::{normalize, ExternalProduct};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shortest barcode accepted (EAN-8).
pub const BARCODE_MIN_LEN: usize = 8;

/// Longest barcode accepted (GTIN-14).
pub const BARCODE_MAX_LEN: usize = 14;

/// Name stored when the upstream source has no product name.
pub const DEFAULT_FOOD_NAME: &str = "Unknown Product";

/// Longest stored product name, in characters.
pub const MAX_FOOD_NAME_LEN: usize = 200;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_SEARCH_LIMIT: i64 = 100;

/// Hard upper bound on a single page.
///
/// ## Business Reason
/// Keeps one request from walking the entire inventory table.
pub const MAX_SEARCH_LIMIT: i64 = 1000;

/// Dietary labels kept by the normalizer.
pub const LABEL_ALLOW_LIST: &[&str] = &[
    "vegan",
    "vegetarian",
    "gluten-free",
    "dairy-free",
    "organic",
    "fair-trade",
];

/// Default look-ahead window for the expiring-items query, in days.
pub const DEFAULT_EXPIRING_DAYS: i64 = 7;

/// Longest look-ahead window for the expiring-items query, in days.
pub const MAX_EXPIRING_DAYS: i64 = 365;

/// Default quantity threshold for the low-stock query.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Most rows accepted by one bulk import request.
pub const MAX_BULK_IMPORT_ROWS: usize = 1000;
