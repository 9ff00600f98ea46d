//! # pantry-db: Inventory Store for the Pantry Scanner
//!
//! This crate owns the `food_items` table: inserting scanned products,
//! searching and paging through them, and deleting them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pantry Data Flow                                 │
//! │                                                                         │
//! │  API route (GET /api/inventory?search=apple)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pantry-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ FoodRepository│    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │   (food.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │       │       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│   FoodQuery   │    │ 001_food_    │  │   │
//! │  │   │               │    │  (query.rs)   │    │   items.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./data/pantry.db)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - `FoodRepository` and its query builder
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pantry_core::SearchFilters;
//! use pantry_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/pantry.db")).await?;
//!
//! let filters = SearchFilters::from_params(None, Some("apple"), Some(20), None)?;
//! let page = db.foods().search(&filters).await?;
//! println!("{} of {} matches", page.records.len(), page.total_count);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::food::FoodRepository;
pub use repository::query::FoodQuery;
