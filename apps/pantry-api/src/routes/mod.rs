//! # HTTP Routes
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────────────────┬──────────────────────────────┐
//! │ Route                                    │ Handler                      │
//! ├──────────────────────────────────────────┼──────────────────────────────┤
//! │ POST   /api/scan                         │ scan::scan                   │
//! │ GET    /api/inventory?barcode&search&... │ inventory::search            │
//! │ POST   /api/inventory                    │ inventory::create            │
//! │ POST   /api/inventory/bulk               │ inventory::bulk_import       │
//! │ DELETE /api/inventory?id|barcode         │ inventory::delete            │
//! │ GET    /api/inventory/expiring?days      │ inventory::expiring          │
//! │ GET    /api/inventory/low-stock?threshold│ inventory::low_stock         │
//! │ GET    /api/inventory/{id}               │ inventory::get_by_id         │
//! │ GET    /health                           │ health::health               │
//! └──────────────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Every response body carries `success`. Failures add `error` (an
//! [`ErrorCode`](crate::ErrorCode)) and `message`.

pub mod health;
pub mod inventory;
pub mod scan;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::SharedState;

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/scan", post(scan::scan))
        .route(
            "/api/inventory",
            get(inventory::search)
                .post(inventory::create)
                .delete(inventory::delete),
        )
        .route("/api/inventory/bulk", post(inventory::bulk_import))
        .route("/api/inventory/expiring", get(inventory::expiring))
        .route("/api/inventory/low-stock", get(inventory::low_stock))
        .route("/api/inventory/{id}", get(inventory::get_by_id))
        .with_state(state)
}

/// Success envelope: `{ "success": true, "data": ..., "message"?: ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Success envelope for plain lists: adds `count`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn ok(data: Vec<T>) -> Self {
        ListResponse {
            success: true,
            count: data.len(),
            data,
        }
    }
}
