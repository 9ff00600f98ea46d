//! # Inventory Routes
//!
//! Browse, add to, and remove from the stored inventory.
//!
//! ## Search Flow
//! ```text
//! GET /api/inventory?search=apple&limit=20&offset=40
//!       │
//!       ▼
//! SearchFilters::from_params   (blank → absent, limit/offset clamped)
//!       │
//!       ▼
//! FoodRepository::search       (one COUNT, one page SELECT)
//!       │
//!       ▼
//! { success, data: [...], count: 20,
//!   pagination: { limit: 20, offset: 40, total: 75, hasMore: true } }
//! ```

use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::routes::{ApiResponse, ListResponse};
use crate::SharedState;
use pantry_core::validation::{
    validate_expiring_days, validate_low_stock_threshold, validate_record_id,
};
use pantry_core::{
    DeleteSelector, FoodRecord, NewFoodRecord, SearchFilters, MAX_BULK_IMPORT_ROWS,
};

// =============================================================================
// Search
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub barcode: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<FoodRecord>,
    /// Records on this page.
    pub count: usize,
    pub pagination: Pagination,
}

/// `GET /api/inventory`. Newest first.
pub async fn search(
    State(state): State<SharedState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let Query(params) = params?;

    let filters = SearchFilters::from_params(
        params.barcode.as_deref(),
        params.search.as_deref(),
        params.limit,
        params.offset,
    )?;

    let page = state.db.foods().search(&filters).await?;
    let has_more = page.has_more();

    info!(
        returned = page.records.len(),
        total = page.total_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Inventory search complete"
    );

    Ok(Json(SearchResponse {
        success: true,
        count: page.records.len(),
        pagination: Pagination {
            limit: page.limit,
            offset: page.offset,
            total: page.total_count,
            has_more,
        },
        data: page.records,
    }))
}

// =============================================================================
// Create / Read
// =============================================================================

/// `POST /api/inventory`. Adds an item without a lookup.
pub async fn create(
    State(state): State<SharedState>,
    payload: Result<Json<NewFoodRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<FoodRecord>>), ApiError> {
    let Json(new) = payload?;
    let new = new.trim_fields();
    new.validate()?;

    let record = state.db.foods().insert(new).await?;
    info!(id = %record.id, barcode = %record.barcode, "Inventory item created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(record).with_message("Item added to inventory")),
    ))
}

/// `GET /api/inventory/{id}`.
pub async fn get_by_id(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FoodRecord>>, ApiError> {
    validate_record_id(&id)?;

    let record = state
        .db
        .foods()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Inventory item not found: {}", id)))?;

    Ok(Json(ApiResponse::ok(record)))
}

// =============================================================================
// Bulk Import
// =============================================================================

/// Body of `POST /api/inventory/bulk`: one object per item, shaped like
/// the single-item create body.
#[derive(Debug, Deserialize)]
pub struct BulkImportRequest {
    pub data: Vec<Value>,
}

/// A row that was skipped, by its position in `data`.
#[derive(Debug, Serialize)]
pub struct BulkRowError {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BulkImportResponse {
    pub success: bool,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<BulkRowError>,
}

/// `POST /api/inventory/bulk`.
///
/// Rows that do not parse or validate are reported and skipped. The rest
/// are stored in one transaction.
pub async fn bulk_import(
    State(state): State<SharedState>,
    payload: Result<Json<BulkImportRequest>, JsonRejection>,
) -> Result<Json<BulkImportResponse>, ApiError> {
    let start = Instant::now();
    let Json(request) = payload?;

    if request.data.len() > MAX_BULK_IMPORT_ROWS {
        return Err(ApiError::bad_request(format!(
            "Bulk import accepts at most {} rows, got {}",
            MAX_BULK_IMPORT_ROWS,
            request.data.len()
        )));
    }

    let mut valid = Vec::with_capacity(request.data.len());
    let mut errors = Vec::new();

    for (index, row) in request.data.into_iter().enumerate() {
        match parse_import_row(row) {
            Ok(new) => valid.push(new),
            Err(message) => {
                debug!(index = index, error = %message, "Skipping import row");
                errors.push(BulkRowError { index, message });
            }
        }
    }

    let imported = state.db.foods().insert_many(valid).await?.len();

    if !errors.is_empty() {
        warn!(failed = errors.len(), "Bulk import skipped rows");
    }
    info!(
        imported = imported,
        failed = errors.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Bulk import complete"
    );

    Ok(Json(BulkImportResponse {
        success: true,
        imported,
        failed: errors.len(),
        errors,
    }))
}

fn parse_import_row(row: Value) -> Result<NewFoodRecord, String> {
    let new: NewFoodRecord = serde_json::from_value(row).map_err(|e| e.to_string())?;
    let new = new.trim_fields();
    new.validate().map_err(|e| e.to_string())?;
    Ok(new)
}

// =============================================================================
// Delete
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted: u64,
}

/// `DELETE /api/inventory?id=...` or `?barcode=...`.
///
/// `id` wins when both are given. Deleting by barcode removes every copy.
pub async fn delete(
    State(state): State<SharedState>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Query(params) = params?;
    let selector = DeleteSelector::from_params(params.id.as_deref(), params.barcode.as_deref())?;

    let deleted = state.db.foods().delete(&selector).await?;
    if deleted == 0 {
        debug!(selector = %selector, "Delete matched nothing");
        return Err(ApiError::not_found(format!(
            "No inventory items found for {}",
            selector
        )));
    }

    info!(selector = %selector, deleted = deleted, "Inventory items deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Deleted {} item(s) for {}", deleted, selector),
        deleted,
    }))
}

// =============================================================================
// Expiring / Low Stock
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringParams {
    pub days: Option<i64>,
}

/// `GET /api/inventory/expiring?days=7`. Soonest first.
pub async fn expiring(
    State(state): State<SharedState>,
    params: Result<Query<ExpiringParams>, QueryRejection>,
) -> Result<Json<ListResponse<FoodRecord>>, ApiError> {
    let Query(params) = params?;
    let days = validate_expiring_days(params.days)?;

    let today = Utc::now().date_naive();
    let records = state.db.foods().expiring_within(days, today).await?;

    debug!(days = days, count = records.len(), "Expiring items listed");
    Ok(Json(ListResponse::ok(records)))
}

#[derive(Debug, Default, Deserialize)]
pub struct LowStockParams {
    pub threshold: Option<i64>,
}

/// `GET /api/inventory/low-stock?threshold=5`. Lowest quantity first.
pub async fn low_stock(
    State(state): State<SharedState>,
    params: Result<Query<LowStockParams>, QueryRejection>,
) -> Result<Json<ListResponse<FoodRecord>>, ApiError> {
    let Query(params) = params?;
    let threshold = validate_low_stock_threshold(params.threshold)?;

    let records = state.db.foods().low_stock(threshold).await?;

    debug!(threshold = threshold, count = records.len(), "Low-stock items listed");
    Ok(Json(ListResponse::ok(records)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::spawn_app;
    use chrono::{Duration, Utc};
    use pantry_core::MAX_BULK_IMPORT_ROWS;
    use serde_json::{json, Value};

    async fn create(base: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/api/inventory", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn get(url: String) -> (u16, Value) {
        let response = reqwest::get(url).await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn delete(url: String) -> (u16, Value) {
        let response = reqwest::Client::new().delete(url).send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (base, _, _) = spawn_app().await;

        let (status, body) = create(
            &base,
            json!({ "barcode": "12345678", "name": "Rice", "quantity": 3, "location": "pantry" }),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["data"]["quantity"], 3);

        let id = body["data"]["id"].as_str().unwrap().to_string();
        let (status, body) = get(format!("{}/api/inventory/{}", base, id)).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["name"], "Rice");
        assert_eq!(body["data"]["location"], "pantry");
    }

    #[tokio::test]
    async fn test_create_trims_text_fields() {
        let (base, _, _) = spawn_app().await;

        let (status, body) = create(
            &base,
            json!({ "barcode": " 12345678 ", "name": "  Rice  ", "brand": "   ",
                    "location": " pantry " }),
        )
        .await;

        assert_eq!(status, 201);
        assert_eq!(body["data"]["barcode"], "12345678");
        assert_eq!(body["data"]["name"], "Rice");
        assert!(body["data"]["brand"].is_null());
        assert_eq!(body["data"]["location"], "pantry");
    }

    #[tokio::test]
    async fn test_bulk_import() {
        let (base, _, state) = spawn_app().await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/inventory/bulk", base))
            .json(&json!({ "data": [
                { "barcode": "123456789", "name": "Apple", "brand": "Fresh Farm",
                  "category": "Fruits", "calories": 52, "expiry_date": "2024-12-31",
                  "quantity": 5, "location": "Fridge A" },
                { "barcode": "987654321", "name": "Banana", "allergens": [] },
                { "barcode": "12ab", "name": "Broken" },
                { "barcode": "555666777" }
            ]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["imported"], 2);
        assert_eq!(body["failed"], 2);
        assert_eq!(body["errors"][0]["index"], 2);
        assert_eq!(body["errors"][1]["index"], 3);
        assert_eq!(state.db.foods().count().await.unwrap(), 2);

        let (_, body) = get(format!("{}/api/inventory?barcode=123456789", base)).await;
        assert_eq!(body["data"][0]["category"], json!(["Fruits"]));
        assert_eq!(body["data"][0]["quantity"], 5);
    }

    #[tokio::test]
    async fn test_bulk_import_limits() {
        let (base, _, state) = spawn_app().await;
        let rows: Vec<Value> = (0..=MAX_BULK_IMPORT_ROWS)
            .map(|_| json!({ "barcode": "12345678", "name": "Rice" }))
            .collect();

        let response = reqwest::Client::new()
            .post(format!("{}/api/inventory/bulk", base))
            .json(&json!({ "data": rows }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(state.db.foods().count().await.unwrap(), 0);

        let response = reqwest::Client::new()
            .post(format!("{}/api/inventory/bulk", base))
            .json(&json!({ "rows": [] }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_records() {
        let (base, _, _) = spawn_app().await;

        let (status, body) = create(&base, json!({ "barcode": "12ab", "name": "Rice" })).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BAD_BARCODE");

        let (status, body) = create(
            &base,
            json!({ "barcode": "12345678", "name": "Rice", "protein": -2.0 }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_missing_and_malformed_ids() {
        let (base, _, _) = spawn_app().await;

        let (status, body) = get(format!(
            "{}/api/inventory/6f1c2a9e-2b43-4c8e-9a51-0d0b7e6f2a10",
            base
        ))
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "NOT_FOUND");

        let (status, body) = get(format!("{}/api/inventory/not-a-uuid", base)).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_search_and_pagination() {
        let (base, _, _) = spawn_app().await;

        create(&base, json!({ "barcode": "11111111", "name": "Organic Apple" })).await;
        create(&base, json!({ "barcode": "22222222", "name": "Apple Juice" })).await;
        create(&base, json!({ "barcode": "33333333", "name": "Milk" })).await;

        let (status, body) = get(format!("{}/api/inventory?search=apple", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["name"], "Apple Juice");

        let (_, body) = get(format!("{}/api/inventory?search=apple&limit=1&offset=1", base)).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["name"], "Organic Apple");
        assert_eq!(body["pagination"]["limit"], 1);
        assert_eq!(body["pagination"]["offset"], 1);
        assert_eq!(body["pagination"]["hasMore"], false);

        let (_, body) = get(format!("{}/api/inventory?limit=1", base)).await;
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["hasMore"], true);

        let (status, body) = get(format!("{}/api/inventory?limit=lots", base)).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_delete() {
        let (base, _, _) = spawn_app().await;

        for _ in 0..3 {
            create(&base, json!({ "barcode": "12345678", "name": "Beans" })).await;
        }

        let (status, body) = delete(format!("{}/api/inventory", base)).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BAD_REQUEST");

        let (status, body) = delete(format!("{}/api/inventory?barcode=12345678", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["deleted"], 3);

        let (status, body) = delete(format!("{}/api/inventory?barcode=12345678", base)).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_prefers_id() {
        let (base, _, state) = spawn_app().await;

        let (_, body) = create(&base, json!({ "barcode": "12345678", "name": "Beans" })).await;
        create(&base, json!({ "barcode": "87654321", "name": "Corn" })).await;
        let id = body["data"]["id"].as_str().unwrap();

        let (status, body) = delete(format!(
            "{}/api/inventory?id={}&barcode=87654321",
            base, id
        ))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["deleted"], 1);

        let remaining = state.db.foods().count().await.unwrap();
        assert_eq!(remaining, 1);
        let (_, body) = get(format!("{}/api/inventory?barcode=87654321", base)).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_expiring_and_low_stock() {
        let (base, _, _) = spawn_app().await;
        let today = Utc::now().date_naive();

        create(
            &base,
            json!({ "barcode": "11111111", "name": "Yogurt", "quantity": 2,
                    "expiry_date": (today + Duration::days(3)).to_string() }),
        )
        .await;
        create(
            &base,
            json!({ "barcode": "22222222", "name": "Rice", "quantity": 9,
                    "expiry_date": (today + Duration::days(200)).to_string() }),
        )
        .await;

        let (status, body) = get(format!("{}/api/inventory/expiring", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["name"], "Yogurt");

        let (_, body) = get(format!("{}/api/inventory/expiring?days=365", base)).await;
        assert_eq!(body["count"], 2);

        let (status, body) = get(format!("{}/api/inventory/expiring?days=0", base)).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (_, body) = get(format!("{}/api/inventory/low-stock", base)).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["name"], "Yogurt");

        let (status, _) = get(format!("{}/api/inventory/low-stock?threshold=-1", base)).await;
        assert_eq!(status, 400);
    }
}
