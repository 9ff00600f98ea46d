//! # Scan Service
//!
//! Runs one scan request end to end: validate the barcode, fetch and
//! normalize the product, and (depending on the mode) store it.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ScanRequest { barcode, action, product? }                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_barcode ──✗──► BadBarcode (no upstream call)                 │
//! │       │                                                                 │
//! │       ├── action = save AND product given                              │
//! │       │        └── barcode must match ──✗──► BadRequest                │
//! │       │                                                                 │
//! │       ├── otherwise                                                    │
//! │       │        ProductSource::lookup ──✗──► ProductNotFound            │
//! │       │                  │           ──✗──► UpstreamUnavailable        │
//! │       │                  ▼                                              │
//! │       │        normalize(barcode, external)                            │
//! │       ▼                                                                 │
//! │  action persists? ── no ──► ScanOutcome { product, record: None }      │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  FoodRepository::insert ──✗──► Persistence { product, source }         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ScanOutcome { product, record: Some(..) }                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookup and insert are not one transaction. A lookup that succeeds is
//! never undone because the insert failed; the product rides along in the
//! error instead.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use pantry_core::validation::validate_barcode;
use pantry_core::{
    normalize, CoreError, FoodRecord, NewFoodRecord, ProcessedProduct, ScanMode, ValidationError,
};
use pantry_db::{Database, DbError};
use pantry_lookup::{LookupError, ProductSource};

// =============================================================================
// Request / Outcome
// =============================================================================

/// Body of `POST /api/scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,

    /// `scan` when omitted.
    #[serde(default, alias = "mode")]
    pub action: ScanMode,

    /// A previously scanned product, resubmitted for `save`.
    #[serde(default)]
    pub product: Option<ProcessedProduct>,
}

impl ScanRequest {
    /// A request that carries only a barcode and a mode.
    pub fn new(barcode: impl Into<String>, action: ScanMode) -> Self {
        ScanRequest {
            barcode: barcode.into(),
            action,
            product: None,
        }
    }
}

/// What a successful scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub mode: ScanMode,
    pub product: ProcessedProduct,
    /// Present when the mode persisted.
    pub record: Option<FoodRecord>,
}

impl ScanOutcome {
    /// Human-readable summary for the response envelope.
    pub fn message(&self) -> &'static str {
        match self.mode {
            ScanMode::Scan => "Product found",
            ScanMode::Save => "Product saved to inventory",
            ScanMode::ScanAndSave => "Product scanned and saved to inventory",
        }
    }

    /// The `data` payload: the product, plus the stored fields when saved.
    pub fn data(&self) -> ScanData<'_> {
        ScanData {
            product: &self.product,
            saved: self.record.as_ref().map(|r| SavedFields {
                id: &r.id,
                quantity: r.quantity,
                location: r.location.as_deref(),
                created_at: r.created_at,
            }),
        }
    }
}

/// Serialized form of a scan result.
#[derive(Debug, Serialize)]
pub struct ScanData<'a> {
    #[serde(flatten)]
    product: &'a ProcessedProduct,
    #[serde(flatten)]
    saved: Option<SavedFields<'a>>,
}

/// Fields only a stored record has. Disjoint from the product's keys.
#[derive(Debug, Serialize)]
struct SavedFields<'a> {
    id: &'a str,
    quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    created_at: DateTime<Utc>,
}

// =============================================================================
// Errors
// =============================================================================

/// Scan failures, one per distinct client-facing outcome.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid barcode '{barcode}': {reason}")]
    BadBarcode { barcode: String, reason: String },

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Product not found: {barcode}")]
    ProductNotFound { barcode: String },

    #[error("Product database unavailable: {0}")]
    UpstreamUnavailable(#[source] LookupError),

    /// The product was looked up but the insert failed.
    #[error("Failed to save product {}: {source}", .product.barcode)]
    Persistence {
        product: Box<ProcessedProduct>,
        #[source]
        source: DbError,
    },
}

impl From<CoreError> for ScanError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BadBarcode { barcode, reason } => ScanError::BadBarcode { barcode, reason },
            CoreError::Validation(e) => ScanError::Validation(e),
            other => ScanError::BadRequest(other.to_string()),
        }
    }
}

impl From<LookupError> for ScanError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound { barcode } => ScanError::ProductNotFound { barcode },
            other => ScanError::UpstreamUnavailable(other),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates lookup, normalization and persistence.
///
/// Holds only shared handles; one instance serves every request.
#[derive(Debug, Clone)]
pub struct ScanService {
    db: Database,
    source: ProductSource,
}

impl ScanService {
    pub fn new(db: Database, source: ProductSource) -> Self {
        ScanService { db, source }
    }

    /// Handles one scan request.
    pub async fn handle(&self, request: ScanRequest) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let mode = request.action;

        let barcode = validate_barcode(&request.barcode).map_err(|e| ScanError::BadBarcode {
            barcode: request.barcode.clone(),
            reason: e.to_string(),
        })?;

        let product = match (mode, request.product) {
            (ScanMode::Save, Some(product)) => {
                debug!(barcode = %barcode, "Saving resubmitted product without lookup");
                Self::resubmitted(&barcode, product)?
            }
            _ => self.lookup(&barcode).await?,
        };

        let record = if mode.persists() {
            Some(self.persist(product.clone()).await?)
        } else {
            None
        };

        info!(
            barcode = %barcode,
            mode = %mode,
            saved = record.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scan handled"
        );

        Ok(ScanOutcome {
            mode,
            product,
            record,
        })
    }

    /// Fetches and normalizes a product.
    pub async fn lookup(&self, barcode: &str) -> Result<ProcessedProduct, ScanError> {
        let external = self.source.lookup(barcode).await?;
        Ok(normalize(barcode, external))
    }

    /// Checks a client-supplied product against the request barcode.
    fn resubmitted(barcode: &str, product: ProcessedProduct) -> Result<ProcessedProduct, ScanError> {
        if product.barcode.trim() != barcode {
            return Err(CoreError::BarcodeMismatch {
                expected: barcode.to_string(),
                actual: product.barcode,
            }
            .into());
        }

        Ok(ProcessedProduct {
            barcode: barcode.to_string(),
            ..product
        })
    }

    /// Stores a product as a new inventory record.
    ///
    /// Names longer than the store allows are cut to fit, so a product the
    /// lookup returned always passes validation.
    async fn persist(&self, product: ProcessedProduct) -> Result<FoodRecord, ScanError> {
        let new = NewFoodRecord::from(product.clone());
        new.validate()?;

        self.db.foods().insert(new).await.map_err(|source| {
            warn!(barcode = %product.barcode, error = %source, "Insert failed after lookup");
            ScanError::Persistence {
                product: Box::new(product),
                source,
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
