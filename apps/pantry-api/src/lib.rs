//! # Pantry API
//!
//! HTTP server for scanning products into a home inventory.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pantry API Server                                │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────────────────────────────────────┐ │
//! │  │   routes     │     │              Arc<AppState>                   │ │
//! │  │              │     │                                              │ │
//! │  │ POST /api/   │────►│  scanner: ScanService ──► ProductSource ─────┼─┼─► product DB
//! │  │      scan    │     │                 │                            │ │
//! │  │              │     │                 ▼                            │ │
//! │  │ /api/        │────►│  db: Database ──► FoodRepository ────────────┼─┼─► SQLite
//! │  │   inventory  │     │                                              │ │
//! │  │ GET /health  │     │  config: ApiConfig                           │ │
//! │  └──────────────┘     └──────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests share nothing mutable. Every handler gets the same read-only
//! state; the pool and the HTTP client do their own synchronization.

pub mod config;
pub mod error;
pub mod routes;
pub mod scan;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use pantry_db::Database;
use pantry_lookup::ProductSource;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use scan::{ScanError, ScanOutcome, ScanRequest, ScanService};

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "pantry_api=info,pantry_db=info,pantry_lookup=info";

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub scanner: ScanService,
    pub config: ApiConfig,
}

/// State handle passed to every handler.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, source: ProductSource, config: ApiConfig) -> Self {
        AppState {
            scanner: ScanService::new(db.clone(), source),
            db,
            config,
        }
    }
}
