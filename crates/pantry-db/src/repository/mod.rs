//! # Repository Module
//!
//! Database access for the pantry inventory.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Route handler / ScanService                                           │
//! │       │                                                                 │
//! │       │  db.foods().search(&filters)                                   │
//! │       ▼                                                                 │
//! │  FoodRepository                                                        │
//! │  ├── insert(new_record)                                                │
//! │  ├── search(&filters) ──► FoodQuery (WHERE clause + bound values)      │
//! │  ├── get_by_id(id)                                                     │
//! │  └── delete(&selector)                                                 │
//! │       │                                                                 │
//! │       │  Parameterized SQL                                             │
//! │       ▼                                                                 │
//! │  SQLite Database (food_items)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`food::FoodRepository`] - Inventory insert, search and delete
//! - [`query::FoodQuery`] - Parameterized filter builder used by search

pub mod food;
pub mod query;
