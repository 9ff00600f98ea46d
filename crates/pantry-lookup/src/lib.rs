//! # pantry-lookup: External Product Database Client
//!
//! Looks up a barcode in an Open Food Facts compatible product database.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ProductSource::lookup("3017620422003")                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {base_url}/api/v2/product/3017620422003.json                      │
//! │       │                                                                 │
//! │       ├── 404 / {"status":0}            ──► LookupError::NotFound      │
//! │       ├── timeout                       ──► LookupError::Timeout       │
//! │       ├── connect error / 5xx           ──► LookupError::Unavailable   │
//! │       ├── body is not product JSON      ──► LookupError::InvalidResponse│
//! │       ▼                                                                 │
//! │  {"status":1, "product":{...}}          ──► ExternalProduct            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One request per lookup. Nothing is retried or cached here.
//!
//! ## Usage
//! ```rust,ignore
//! use pantry_lookup::{ProductSource, SourceConfig};
//!
//! let source = ProductSource::new(SourceConfig::default())?;
//! let external = source.lookup("3017620422003").await?;
//! let product = pantry_core::normalize("3017620422003", external);
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::ProductSource;
pub use config::SourceConfig;
pub use error::{LookupError, LookupResult};
